//! Core domain model and statically seeded catalog data for EduMarket.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CRATE_NAME: &str = "edumarket-core";

/// Maximum number of entries retained in the view history.
pub const VIEW_HISTORY_LIMIT: usize = 20;

/// Number of catalog courses attached to the assistant's generic fallback reply.
pub const DEFAULT_SAMPLE_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
        }
    }
}

/// One purchasable learning product in the catalog.
///
/// Identifiers are unique and stable; records are immutable once seeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub price: u64,
    pub original_price: Option<u64>,
    pub image: String,
    pub short_description: String,
    pub long_description: String,
    pub instructor: String,
    pub rating: f64,
    pub review_count: u64,
    pub duration: String,
    pub level: Level,
    pub category: String,
    pub skills: Vec<String>,
    pub language: String,
    pub last_updated: NaiveDate,
    pub students: u64,
    pub certificate: bool,
}

impl Course {
    /// Discount percentage when an original price is present and higher.
    pub fn discount_percent(&self) -> Option<u64> {
        match self.original_price {
            Some(original) if original > self.price => {
                Some(((original - self.price) * 100) / original)
            }
            _ => None,
        }
    }
}

/// One fixed price bucket. `max` is `None` for the open-ended top bucket;
/// bounds are inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub label: &'static str,
    pub min: u64,
    pub max: Option<u64>,
}

impl PriceRange {
    pub fn contains(&self, price: u64) -> bool {
        price >= self.min && self.max.map_or(true, |max| price <= max)
    }
}

/// Fixed ordered price buckets. Index 0 is the "all prices" sentinel and must
/// never be excluded by comparison logic.
pub const PRICE_RANGES: &[PriceRange] = &[
    PriceRange { label: "Tất cả giá", min: 0, max: None },
    PriceRange { label: "Dưới 500K", min: 0, max: Some(500_000) },
    PriceRange { label: "500K - 1 triệu", min: 500_000, max: Some(1_000_000) },
    PriceRange { label: "1 - 1.5 triệu", min: 1_000_000, max: Some(1_500_000) },
    PriceRange { label: "Trên 1.5 triệu", min: 1_500_000, max: None },
];

/// Closed category set. Index 0 is the "all categories" sentinel label.
pub const CATEGORIES: &[&str] = &[
    "Tất cả",
    "Language Learning",
    "Programming",
    "Marketing",
    "Design",
    "Data Science",
    "Creative Arts",
    "Business",
];

pub const ALL_CATEGORIES: &str = CATEGORIES[0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    User,
    Assistant,
}

/// One entry in the session-scoped conversation. Conversations are
/// append-only and never persisted past the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub author: Author,
    pub text: String,
    pub sent_at: DateTime<Utc>,
    pub courses: Vec<Course>,
}

impl ChatMessage {
    pub fn new(author: Author, text: impl Into<String>, courses: Vec<Course>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            text: text.into(),
            sent_at: Utc::now(),
            courses,
        }
    }
}

/// Renders an amount in VND with dot-grouped thousands, e.g. `899.000 ₫`.
pub fn format_vnd(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped.push_str(" ₫");
    grouped
}

fn seed_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("seed dates are valid")
}

fn skills(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

/// The statically seeded catalog shipped with the application. There is no
/// network fetch for catalog data in this version.
pub fn seed_catalog() -> Vec<Course> {
    vec![
        Course {
            id: "1".into(),
            title: "Complete English Conversation with Native Americans".into(),
            price: 899_000,
            original_price: Some(1_299_000),
            image: "https://images.unsplash.com/photo-1434030216411-0b793f4b4173?w=400&h=300&fit=crop".into(),
            short_description: "Master English conversation skills with certified American teachers through interactive lessons.".into(),
            long_description: "This comprehensive course is designed to help you achieve fluency in English conversation with native American speakers. You'll learn authentic pronunciation, natural expressions, and cultural nuances that will make you sound like a native speaker. The course includes 1-on-1 sessions with certified American instructors, group practice sessions, and real-world conversation scenarios.".into(),
            instructor: "Sarah Johnson".into(),
            rating: 4.9,
            review_count: 2_847,
            duration: "12 weeks".into(),
            level: Level::Intermediate,
            category: "Language Learning".into(),
            skills: skills(&["Conversation", "Pronunciation", "Grammar", "Listening"]),
            language: "English".into(),
            last_updated: seed_date(2024, 1, 15),
            students: 15_420,
            certificate: true,
        },
        Course {
            id: "2".into(),
            title: "React & TypeScript - Complete Developer Course".into(),
            price: 1_299_000,
            original_price: Some(1_899_000),
            image: "https://images.unsplash.com/photo-1633356122544-f134324a6cee?w=400&h=300&fit=crop".into(),
            short_description: "Build modern web applications with React, TypeScript, and industry best practices.".into(),
            long_description: "Learn to build scalable, type-safe React applications from scratch. This course covers everything from basic React concepts to advanced patterns, state management with Redux Toolkit, testing, and deployment. You'll work on real-world projects and learn industry best practices used by top tech companies.".into(),
            instructor: "Alex Chen".into(),
            rating: 4.8,
            review_count: 1_923,
            duration: "16 weeks".into(),
            level: Level::Intermediate,
            category: "Programming".into(),
            skills: skills(&["React", "TypeScript", "Redux", "Testing", "Deployment"]),
            language: "Vietnamese".into(),
            last_updated: seed_date(2024, 1, 10),
            students: 8_934,
            certificate: true,
        },
        Course {
            id: "3".into(),
            title: "Digital Marketing Mastery 2024".into(),
            price: 799_000,
            original_price: None,
            image: "https://images.unsplash.com/photo-1460925895917-afdab827c52f?w=400&h=300&fit=crop".into(),
            short_description: "Complete digital marketing course covering SEO, social media, PPC, and analytics.".into(),
            long_description: "Master all aspects of digital marketing in this comprehensive course. Learn SEO optimization, social media marketing, Google Ads, Facebook advertising, email marketing, content strategy, and analytics. This course is perfect for beginners and includes hands-on projects with real businesses.".into(),
            instructor: "Maria Rodriguez".into(),
            rating: 4.7,
            review_count: 3_156,
            duration: "10 weeks".into(),
            level: Level::Beginner,
            category: "Marketing".into(),
            skills: skills(&["SEO", "Social Media", "PPC", "Analytics", "Content Marketing"]),
            language: "English".into(),
            last_updated: seed_date(2024, 1, 20),
            students: 12_678,
            certificate: true,
        },
        Course {
            id: "4".into(),
            title: "UI/UX Design Fundamentals".into(),
            price: 1_099_000,
            original_price: Some(1_499_000),
            image: "https://images.unsplash.com/photo-1559028006-448665bd7c7f?w=400&h=300&fit=crop".into(),
            short_description: "Learn design thinking, user research, prototyping, and create stunning user interfaces.".into(),
            long_description: "Become a professional UI/UX designer with this hands-on course. Learn design thinking methodology, conduct user research, create wireframes and prototypes, and design beautiful user interfaces. Master tools like Figma, Adobe XD, and Sketch while working on real client projects.".into(),
            instructor: "David Kim".into(),
            rating: 4.9,
            review_count: 1_654,
            duration: "14 weeks".into(),
            level: Level::Beginner,
            category: "Design".into(),
            skills: skills(&["Design Thinking", "User Research", "Prototyping", "Figma", "User Testing"]),
            language: "Vietnamese".into(),
            last_updated: seed_date(2024, 1, 12),
            students: 7_832,
            certificate: true,
        },
        Course {
            id: "5".into(),
            title: "Python Data Science & Machine Learning".into(),
            price: 1_599_000,
            original_price: None,
            image: "https://images.unsplash.com/photo-1526379095098-d400fd0bf935?w=400&h=300&fit=crop".into(),
            short_description: "Master data science and machine learning with Python, pandas, scikit-learn, and TensorFlow.".into(),
            long_description: "Dive deep into data science and machine learning using Python. Learn data analysis with pandas, visualization with matplotlib and seaborn, machine learning with scikit-learn, and deep learning with TensorFlow. This course includes real-world projects and prepares you for a career in data science.".into(),
            instructor: "Dr. Jennifer Wang".into(),
            rating: 4.8,
            review_count: 2_341,
            duration: "20 weeks".into(),
            level: Level::Advanced,
            category: "Data Science".into(),
            skills: skills(&["Python", "Pandas", "Machine Learning", "TensorFlow", "Data Visualization"]),
            language: "English".into(),
            last_updated: seed_date(2024, 1, 8),
            students: 6_543,
            certificate: true,
        },
        Course {
            id: "6".into(),
            title: "Japanese Language for Beginners - JLPT N5".into(),
            price: 699_000,
            original_price: Some(999_000),
            image: "https://images.unsplash.com/photo-1528164344705-47542687000d?w=400&h=300&fit=crop".into(),
            short_description: "Learn Japanese from scratch and prepare for JLPT N5 certification with native speakers.".into(),
            long_description: "Start your Japanese learning journey with this comprehensive beginner course. Learn hiragana, katakana, basic kanji, essential grammar, and everyday conversations. This course is designed to prepare you for the JLPT N5 exam and includes practice with native Japanese speakers.".into(),
            instructor: "Tanaka Hiroshi".into(),
            rating: 4.6,
            review_count: 1_876,
            duration: "16 weeks".into(),
            level: Level::Beginner,
            category: "Language Learning".into(),
            skills: skills(&["Hiragana", "Katakana", "Basic Kanji", "Grammar", "Conversation"]),
            language: "Vietnamese".into(),
            last_updated: seed_date(2024, 1, 18),
            students: 9_876,
            certificate: true,
        },
        Course {
            id: "7".into(),
            title: "Photography Masterclass - From Beginner to Pro".into(),
            price: 899_000,
            original_price: None,
            image: "https://images.unsplash.com/photo-1606983340126-99ab4feaa64a?w=400&h=300&fit=crop".into(),
            short_description: "Master photography techniques, composition, lighting, and post-processing with Adobe Lightroom.".into(),
            long_description: "Transform your photography skills from beginner to professional level. Learn camera fundamentals, composition techniques, lighting mastery, portrait photography, landscape photography, and advanced post-processing with Adobe Lightroom and Photoshop. Includes hands-on assignments and portfolio development.".into(),
            instructor: "Michael Thompson".into(),
            rating: 4.7,
            review_count: 2_198,
            duration: "12 weeks".into(),
            level: Level::Beginner,
            category: "Creative Arts".into(),
            skills: skills(&["Camera Basics", "Composition", "Lighting", "Lightroom", "Portfolio"]),
            language: "English".into(),
            last_updated: seed_date(2024, 1, 14),
            students: 11_234,
            certificate: true,
        },
        Course {
            id: "8".into(),
            title: "Business Analysis & Project Management".into(),
            price: 1_199_000,
            original_price: Some(1_699_000),
            image: "https://images.unsplash.com/photo-1554224155-6726b3ff858f?w=400&h=300&fit=crop".into(),
            short_description: "Learn business analysis, project management methodologies, and prepare for PMP certification.".into(),
            long_description: "Become a skilled business analyst and project manager with this comprehensive course. Learn requirements gathering, process improvement, Agile and Scrum methodologies, risk management, and stakeholder communication. This course prepares you for PMP and other professional certifications.".into(),
            instructor: "Linda Parker".into(),
            rating: 4.8,
            review_count: 1_432,
            duration: "18 weeks".into(),
            level: Level::Intermediate,
            category: "Business".into(),
            skills: skills(&["Business Analysis", "Project Management", "Agile", "Scrum", "Risk Management"]),
            language: "Vietnamese".into(),
            last_updated: seed_date(2024, 1, 16),
            students: 5_678,
            certificate: true,
        },
    ]
}
