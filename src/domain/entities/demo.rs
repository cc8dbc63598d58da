//! Fixed sample content shown when the catalog cannot be read, and used to
//! seed an empty catalog from the admin page.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entities::project::{Project, ProjectInsert};

struct DemoRecord {
    title: &'static str,
    short_description: &'static str,
    description: &'static str,
    category: &'static str,
    technologies: &'static [&'static str],
    features: &'static [&'static str],
    images: &'static [&'static str],
    live_url: &'static str,
    github_url: &'static str,
    duration: &'static str,
    role: &'static str,
    client: &'static str,
    challenges: &'static str,
}

const SAMPLE_PROJECTS: [DemoRecord; 3] = [
    DemoRecord {
        title: "E-Commerce Platform",
        short_description: "A full-stack e-commerce solution with modern UI",
        description: "This is a comprehensive e-commerce platform built with React and Node.js. It features a modern, responsive design with advanced functionality including user authentication, payment processing, inventory management, and admin dashboard.",
        category: "Web Development",
        technologies: &["React", "Node.js", "MongoDB", "Stripe", "Redux", "Express.js"],
        features: &[
            "User authentication and authorization",
            "Shopping cart and wishlist functionality",
            "Secure payment processing with Stripe",
            "Admin dashboard for inventory management",
            "Responsive design for all devices",
            "Search and filter functionality",
        ],
        images: &[
            "https://via.placeholder.com/800x600/667eea/ffffff?text=E-Commerce+Platform",
            "https://via.placeholder.com/800x600/764ba2/ffffff?text=Admin+Dashboard",
            "https://via.placeholder.com/800x600/ff7461/ffffff?text=Mobile+View",
        ],
        live_url: "https://example.com",
        github_url: "https://github.com/example",
        duration: "3 months",
        role: "Full Stack Developer",
        client: "Tech Startup",
        challenges: "One of the main challenges was implementing a secure payment system while maintaining a smooth user experience. This was solved by integrating Stripe's secure payment APIs and implementing proper error handling.",
    },
    DemoRecord {
        title: "Mobile Banking App",
        short_description: "Secure mobile banking application with intuitive design",
        description: "A comprehensive mobile banking application built with React Native. Features include account management, transfers, bill payments, and advanced security measures.",
        category: "Mobile Development",
        technologies: &["React Native", "Firebase", "Redux", "TypeScript"],
        features: &[
            "Secure user authentication with biometrics",
            "Account balance and transaction history",
            "Money transfers and bill payments",
            "Push notifications for transactions",
            "Dark/Light mode support",
            "Offline data synchronization",
        ],
        images: &[
            "https://via.placeholder.com/800x600/667eea/ffffff?text=Banking+App",
            "https://via.placeholder.com/800x600/764ba2/ffffff?text=Transfer+Screen",
            "https://via.placeholder.com/800x600/ff7461/ffffff?text=Dashboard",
        ],
        live_url: "https://apps.apple.com/example",
        github_url: "https://github.com/example",
        duration: "4 months",
        role: "Mobile Developer",
        client: "Financial Institution",
        challenges: "Implementing bank-level security while maintaining user experience was crucial. Used advanced encryption and biometric authentication.",
    },
    DemoRecord {
        title: "Portfolio Website",
        short_description: "Modern portfolio website with animations",
        description: "A stunning portfolio website built with React and Framer Motion. Features smooth animations, responsive design, and an admin panel for content management.",
        category: "UI/UX Design",
        technologies: &["React", "Framer Motion", "CSS3", "Firebase"],
        features: &[
            "Smooth scroll animations",
            "Responsive grid layout",
            "Dark mode theme",
            "Contact form integration",
            "SEO optimization",
            "Fast loading performance",
        ],
        images: &[
            "https://via.placeholder.com/800x600/667eea/ffffff?text=Portfolio+Website",
            "https://via.placeholder.com/800x600/764ba2/ffffff?text=Projects+Section",
            "https://via.placeholder.com/800x600/ff7461/ffffff?text=Contact+Form",
        ],
        live_url: "https://portfolio.example.com",
        github_url: "https://github.com/example",
        duration: "2 months",
        role: "Frontend Developer & Designer",
        client: "Personal Project",
        challenges: "Creating smooth animations while maintaining performance across different devices required careful optimization of animation triggers.",
    },
];

const DETAIL_PROJECT: DemoRecord = DemoRecord {
    title: "E-Commerce Platform",
    short_description: "A full-stack e-commerce solution with modern UI",
    description: "This comprehensive e-commerce platform was built using React and Node.js with modern design principles. The application features advanced functionality including user authentication and authorization systems. Payment processing was integrated using Stripe for secure transactions. An inventory management system was developed for efficient product handling. An admin dashboard provides complete control over the platform. The platform incorporates industry best practices for security and performance optimization.",
    category: "Web Development",
    technologies: &["React", "Node.js", "MongoDB", "Stripe", "Redux", "Express.js"],
    features: &[
        "User authentication and authorization",
        "Shopping cart and wishlist functionality",
        "Secure payment processing with Stripe",
        "Admin dashboard for inventory management",
        "Responsive design for all devices",
        "Search and filter functionality",
    ],
    images: &[
        "/api/placeholder/800/600",
        "/api/placeholder/800/600",
        "/api/placeholder/800/600",
    ],
    live_url: "https://example.com",
    github_url: "https://github.com/example",
    duration: "3 months",
    role: "Full Stack Developer",
    client: "Personal Project",
    challenges: "The main challenge was implementing a secure payment system while maintaining smooth user experience. This required extensive research into payment processing security protocols and third-party API integration. Another significant challenge involved optimizing application performance under high traffic loads. Database query optimization was necessary to handle large datasets efficiently. The solution involved implementing Stripe's secure payment APIs with proper error handling mechanisms. Redis caching strategies were implemented to improve performance. MongoDB indexing was optimized for faster query execution.",
};

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

impl DemoRecord {
    fn to_insert(&self) -> ProjectInsert {
        ProjectInsert {
            title: self.title.to_string(),
            short_description: self.short_description.to_string(),
            description: self.description.to_string(),
            category: self.category.to_string(),
            technologies: owned(self.technologies),
            features: owned(self.features),
            image: self.images[0].to_string(),
            images: owned(self.images),
            live_url: Some(self.live_url.to_string()),
            github_url: Some(self.github_url.to_string()),
            duration: Some(self.duration.to_string()),
            role: Some(self.role.to_string()),
            client: Some(self.client.to_string()),
            challenges: Some(self.challenges.to_string()),
        }
    }

    fn to_project(&self, id: Uuid, created_at: DateTime<Utc>) -> Project {
        let insert = self.to_insert();
        Project {
            id,
            title: insert.title,
            short_description: insert.short_description,
            description: insert.description,
            category: insert.category,
            technologies: insert.technologies,
            features: insert.features,
            image: insert.image,
            images: insert.images,
            live_url: insert.live_url,
            github_url: insert.github_url,
            duration: insert.duration,
            role: insert.role,
            client: insert.client,
            challenges: insert.challenges,
            created_at,
            updated_at: created_at,
        }
    }
}

/// Identifier of the `n`th demo record (1-based). Stable across restarts.
pub fn demo_id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

/// The three sample projects the listing shows when the catalog is unreachable.
pub fn demo_projects() -> Vec<Project> {
    SAMPLE_PROJECTS
        .iter()
        .enumerate()
        .map(|(index, record)| record.to_project(demo_id(index as u128 + 1), DateTime::<Utc>::UNIX_EPOCH))
        .collect()
}

/// The single record the detail page shows on a miss or an outage.
pub fn demo_project() -> Project {
    DETAIL_PROJECT.to_project(demo_id(1), DateTime::<Utc>::UNIX_EPOCH)
}

/// Records written by the admin "seed demo data" action.
pub fn demo_seed_inserts() -> Vec<ProjectInsert> {
    SAMPLE_PROJECTS.iter().map(DemoRecord::to_insert).collect()
}
