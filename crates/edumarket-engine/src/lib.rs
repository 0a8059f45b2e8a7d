//! Catalog filtering and assistant intent matching for EduMarket.
//!
//! Both components are pure functions over the seeded catalog: no I/O, no
//! shared state, no mutation of the input. The assistant side is a
//! deterministic keyword rule table evaluated top to bottom, first match
//! wins; "AI" is purely branding.

use edumarket_core::{Course, PriceRange, ALL_CATEGORIES, DEFAULT_SAMPLE_SIZE, PRICE_RANGES};
use serde::{Deserialize, Serialize};

pub const CRATE_NAME: &str = "edumarket-engine";

/// Selects one of the fixed price buckets, or all of them.
///
/// `Bucket(i)` is an offset into the non-sentinel ranges, so `Bucket(0)` is
/// "Dưới 500K". An out-of-bounds offset resolves to `All` rather than
/// failing the predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PriceSelector {
    #[default]
    All,
    Bucket(usize),
}

impl PriceSelector {
    /// Parses the selector from its query-string form: `all` or a bucket
    /// offset. Anything unparseable degrades to `All`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "all" => PriceSelector::All,
            other => other
                .parse::<usize>()
                .map(PriceSelector::Bucket)
                .unwrap_or(PriceSelector::All),
        }
    }

    fn resolve(self) -> Option<PriceRange> {
        match self {
            PriceSelector::All => None,
            // +1 skips the "all prices" sentinel at index 0.
            PriceSelector::Bucket(offset) => PRICE_RANGES.get(offset + 1).copied(),
        }
    }
}

/// The three filter inputs of the catalog view. `Default` is the cleared
/// state: empty search, both selectors on their "all" sentinels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterQuery {
    pub search: String,
    pub price: PriceSelector,
    pub category: String,
}

impl Default for FilterQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            price: PriceSelector::All,
            category: ALL_CATEGORIES.to_string(),
        }
    }
}

impl FilterQuery {
    pub fn is_cleared(&self) -> bool {
        self == &Self::default()
    }

    /// Resets both selectors to their sentinels, keeping the search term.
    /// Idempotent; applying the cleared query restores the full catalog.
    pub fn clear_filters(&mut self) {
        self.price = PriceSelector::All;
        self.category = ALL_CATEGORIES.to_string();
    }
}

fn matches_search(course: &Course, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle = needle.to_lowercase();
    course.title.to_lowercase().contains(&needle)
        || course.instructor.to_lowercase().contains(&needle)
        || course.category.to_lowercase().contains(&needle)
}

fn matches_price(course: &Course, selector: PriceSelector) -> bool {
    match selector.resolve() {
        None => true,
        Some(range) => range.contains(course.price),
    }
}

fn matches_category(course: &Course, selected: &str) -> bool {
    selected == ALL_CATEGORIES || course.category == selected
}

/// Returns the sub-sequence of `courses` passing all three predicates,
/// preserving the input order. Never mutates the catalog.
pub fn filter_catalog(courses: &[Course], query: &FilterQuery) -> Vec<Course> {
    courses
        .iter()
        .filter(|course| {
            matches_search(course, &query.search)
                && matches_price(course, query.price)
                && matches_category(course, &query.category)
        })
        .cloned()
        .collect()
}

/// Opening message the assistant seeds every conversation with.
pub const GREETING: &str = "Xin chào! Tôi là AI Assistant của EduMarket. Tôi có thể giúp bạn tìm kiếm khóa học phù hợp. Hãy cho tôi biết bạn muốn học gì nhé! 📚";

/// What the assistant hands back for one user message: a canned response and
/// the courses it wants to show alongside, possibly none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub text: String,
    pub courses: Vec<Course>,
}

struct KeywordGroup {
    keywords: &'static [&'static str],
    reply: &'static str,
    picks: fn(&Course) -> bool,
}

fn picks_english(course: &Course) -> bool {
    course.category == "Language Learning" && course.title.to_lowercase().contains("english")
}

fn picks_programming(course: &Course) -> bool {
    course.category == "Programming"
        || course
            .skills
            .iter()
            .any(|skill| ["React", "TypeScript", "Python"].contains(&skill.as_str()))
}

fn picks_marketing(course: &Course) -> bool {
    course.category == "Marketing"
}

fn picks_design(course: &Course) -> bool {
    course.category == "Design"
}

fn picks_data_science(course: &Course) -> bool {
    course.category == "Data Science" || course.skills.iter().any(|skill| skill == "Python")
}

fn picks_photography(course: &Course) -> bool {
    course.category == "Creative Arts"
}

fn picks_japanese(course: &Course) -> bool {
    let title = course.title.to_lowercase();
    title.contains("japanese") || title.contains("nhật")
}

fn picks_business(course: &Course) -> bool {
    course.category == "Business"
}

/// Priority-ordered rule table. Evaluation is top to bottom and stops at the
/// first group with any keyword present in the message; no scoring.
const KEYWORD_GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        keywords: &["tiếng anh", "english", "nói tiếng anh", "giao tiếp"],
        reply: "Tuyệt vời! Tôi tìm thấy một số khóa học tiếng Anh chất lượng cao cho bạn:",
        picks: picks_english,
    },
    KeywordGroup {
        keywords: &["lập trình", "programming", "react", "typescript", "code"],
        reply: "Rất tốt! Đây là những khóa học lập trình được đánh giá cao:",
        picks: picks_programming,
    },
    KeywordGroup {
        keywords: &["marketing", "digital marketing", "quảng cáo", "bán hàng"],
        reply: "Marketing là lĩnh vực rất hot hiện nay! Tôi gợi ý những khóa học này:",
        picks: picks_marketing,
    },
    KeywordGroup {
        keywords: &["thiết kế", "design", "ui", "ux", "đồ họa"],
        reply: "Thiết kế là một kỹ năng tuyệt vời! Đây là những khóa học design phù hợp:",
        picks: picks_design,
    },
    KeywordGroup {
        keywords: &["data science", "machine learning", "dữ liệu", "ai", "python"],
        reply: "Data Science là tương lai! Tôi tìm thấy những khóa học tuyệt vời này:",
        picks: picks_data_science,
    },
    KeywordGroup {
        keywords: &["nhiếp ảnh", "photography", "chụp ảnh", "photo"],
        reply: "Nhiếp ảnh là nghệ thuật tuyệt đẹp! Khóa học này sẽ giúp bạn:",
        picks: picks_photography,
    },
    KeywordGroup {
        keywords: &["tiếng nhật", "japanese", "jlpt", "nhật bản"],
        reply: "Tiếng Nhật rất thú vị! Tôi có khóa học phù hợp cho người mới bắt đầu:",
        picks: picks_japanese,
    },
    KeywordGroup {
        keywords: &["business", "kinh doanh", "quản lý", "dự án"],
        reply: "Kỹ năng kinh doanh rất quan trọng! Đây là những khóa học tôi gợi ý:",
        picks: picks_business,
    },
];

struct TopicHeuristic {
    keywords: &'static [&'static str],
    reply: &'static str,
}

/// Informational answers for topics that are not course lookups. These carry
/// no attached courses.
const TOPIC_HEURISTICS: &[TopicHeuristic] = &[
    TopicHeuristic {
        keywords: &["giá", "bao nhiêu"],
        reply: "Các khóa học trên nền tảng có mức giá đa dạng từ 500K đến 2 triệu VNĐ. Bạn có thể sử dụng bộ lọc giá để tìm khóa học phù hợp với ngân sách. Bạn đang tìm khóa học trong tầm giá nào? 💰",
    },
    TopicHeuristic {
        keywords: &["chứng chỉ", "certificate"],
        reply: "Hầu hết các khóa học đều cấp chứng chỉ hoàn thành được công nhận. Bạn có thể xem thông tin chứng chỉ trong phần chi tiết khóa học. Bạn đang quan tâm đến lĩnh vực nào? 🏆",
    },
    TopicHeuristic {
        keywords: &["thời gian", "bao lâu"],
        reply: "Thời gian học tùy thuộc vào từng khóa học, thường từ 8-20 tuần. Bạn có thể học theo tốc độ của mình với các video bài giảng có thể xem lại nhiều lần. Bạn muốn tìm khóa học ngắn hạn hay dài hạn? ⏰",
    },
];

const FALLBACK_REPLY: &str = "Tôi hiểu bạn đang tìm kiếm khóa học! Để tôi có thể gợi ý chính xác hơn, bạn có thể cho tôi biết:\n\n• Bạn muốn học lĩnh vực gì? (tiếng Anh, lập trình, marketing, thiết kế...)\n• Mức độ của bạn? (mới bắt đầu, trung cấp, nâng cao)\n• Ngân sách mong muốn?\n\nVí dụ: \"Tôi muốn học tiếng Anh giao tiếp\" hoặc \"Tôi cần học lập trình React\" 🤖";

/// Produces the assistant's reply for one free-text message. Synchronous and
/// total: every message gets a reply, nothing here can fail. The simulated
/// "thinking" delay and typing indicator are presentation concerns layered
/// on top by the caller.
pub fn respond(message: &str, catalog: &[Course]) -> AssistantReply {
    let lowered = message.to_lowercase();

    for group in KEYWORD_GROUPS {
        if group.keywords.iter().any(|keyword| lowered.contains(keyword)) {
            return AssistantReply {
                text: group.reply.to_string(),
                courses: catalog.iter().filter(|c| (group.picks)(c)).cloned().collect(),
            };
        }
    }

    for heuristic in TOPIC_HEURISTICS {
        if heuristic.keywords.iter().any(|keyword| lowered.contains(keyword)) {
            return AssistantReply {
                text: heuristic.reply.to_string(),
                courses: vec![],
            };
        }
    }

    // Explicit terminal case: nothing matched, clarify and show a sample.
    AssistantReply {
        text: FALLBACK_REPLY.to_string(),
        courses: catalog.iter().take(DEFAULT_SAMPLE_SIZE).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edumarket_core::seed_catalog;

    fn query(search: &str, price: PriceSelector, category: &str) -> FilterQuery {
        FilterQuery {
            search: search.to_string(),
            price,
            category: category.to_string(),
        }
    }

    #[test]
    fn empty_search_matches_every_course() {
        let catalog = seed_catalog();
        let filtered = filter_catalog(&catalog, &FilterQuery::default());
        assert_eq!(filtered, catalog);
    }

    #[test]
    fn search_matches_title_substring_case_insensitively() {
        let catalog = seed_catalog();
        let filtered = filter_catalog(&catalog, &query("REACT", PriceSelector::All, ALL_CATEGORIES));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "2");
    }

    #[test]
    fn search_matches_instructor_and_category_too() {
        let catalog = seed_catalog();
        let by_instructor =
            filter_catalog(&catalog, &query("tanaka", PriceSelector::All, ALL_CATEGORIES));
        assert_eq!(by_instructor.len(), 1);
        assert_eq!(by_instructor[0].id, "6");

        let by_category =
            filter_catalog(&catalog, &query("language", PriceSelector::All, ALL_CATEGORIES));
        assert_eq!(by_category.len(), 2);
    }

    #[test]
    fn price_bucket_bounds_are_inclusive() {
        let mut catalog = seed_catalog();
        catalog[0].price = 1_000_000;
        catalog[1].price = 1_000_001;
        // Bucket 1 is "500K - 1 triệu".
        let filtered = filter_catalog(
            &catalog,
            &query("", PriceSelector::Bucket(1), ALL_CATEGORIES),
        );
        let ids: Vec<&str> = filtered.iter().map(|c| c.id.as_str()).collect();
        assert!(ids.contains(&"1"));
        assert!(!ids.contains(&"2"));
    }

    #[test]
    fn out_of_bounds_bucket_degrades_to_all() {
        let catalog = seed_catalog();
        let filtered = filter_catalog(
            &catalog,
            &query("", PriceSelector::Bucket(99), ALL_CATEGORIES),
        );
        assert_eq!(filtered, catalog);
    }

    #[test]
    fn category_filter_is_exact_match() {
        let catalog = seed_catalog();
        let filtered = filter_catalog(&catalog, &query("", PriceSelector::All, "Programming"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].category, "Programming");
    }

    #[test]
    fn predicates_are_anded() {
        let catalog = seed_catalog();
        // "english" matches course 1 by title, but the Programming category
        // filter excludes it.
        let filtered = filter_catalog(&catalog, &query("english", PriceSelector::All, "Programming"));
        assert!(filtered.is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let catalog = seed_catalog();
        let q = query("", PriceSelector::Bucket(2), ALL_CATEGORIES);
        let once = filter_catalog(&catalog, &q);
        let twice = filter_catalog(&once, &q);
        assert_eq!(once, twice);
    }

    #[test]
    fn clearing_filters_restores_full_catalog_in_order() {
        let catalog = seed_catalog();
        let mut q = query("", PriceSelector::Bucket(0), "Design");
        assert_ne!(filter_catalog(&catalog, &q), catalog);

        q.clear_filters();
        assert_eq!(filter_catalog(&catalog, &q), catalog);
        // Idempotent: clearing again changes nothing.
        q.clear_filters();
        assert_eq!(filter_catalog(&catalog, &q), catalog);
    }

    #[test]
    fn price_selector_parsing_degrades_to_all() {
        assert_eq!(PriceSelector::parse("all"), PriceSelector::All);
        assert_eq!(PriceSelector::parse(""), PriceSelector::All);
        assert_eq!(PriceSelector::parse("2"), PriceSelector::Bucket(2));
        assert_eq!(PriceSelector::parse("banana"), PriceSelector::All);
        assert_eq!(PriceSelector::parse("-1"), PriceSelector::All);
    }

    #[test]
    fn programming_message_matches_programming_group() {
        let catalog = seed_catalog();
        let reply = respond("Tôi muốn học lập trình React", &catalog);
        assert_eq!(
            reply.text,
            "Rất tốt! Đây là những khóa học lập trình được đánh giá cao:"
        );
        assert!(!reply.courses.is_empty());
        for course in &reply.courses {
            let skilled = course
                .skills
                .iter()
                .any(|s| ["React", "TypeScript", "Python"].contains(&s.as_str()));
            assert!(course.category == "Programming" || skilled, "course {}", course.id);
        }
    }

    #[test]
    fn first_matching_group_wins() {
        let catalog = seed_catalog();
        // "tiếng anh" (group 1) and "lập trình" (group 2) both present; the
        // earlier group must answer.
        let reply = respond("tiếng anh hay lập trình?", &catalog);
        assert_eq!(
            reply.text,
            "Tuyệt vời! Tôi tìm thấy một số khóa học tiếng Anh chất lượng cao cho bạn:"
        );
    }

    #[test]
    fn price_inquiry_returns_info_without_courses() {
        let catalog = seed_catalog();
        let reply = respond("Khóa học giá bao nhiêu?", &catalog);
        assert!(reply.text.contains("bộ lọc giá"));
        assert!(reply.courses.is_empty());
    }

    #[test]
    fn certificate_and_duration_inquiries_are_informational() {
        let catalog = seed_catalog();
        assert!(respond("có certificate không", &catalog).courses.is_empty());
        assert!(respond("học bao lâu thì xong", &catalog).courses.is_empty());
    }

    #[test]
    fn greeting_falls_back_to_default_sample() {
        let catalog = seed_catalog();
        let reply = respond("xin chào", &catalog);
        assert_eq!(reply.text, FALLBACK_REPLY);
        assert_eq!(reply.courses.len(), DEFAULT_SAMPLE_SIZE);
        assert_eq!(reply.courses[0].id, catalog[0].id);
    }

    #[test]
    fn respond_is_total_on_empty_and_odd_input() {
        let catalog = seed_catalog();
        assert!(!respond("", &catalog).text.is_empty());
        assert!(!respond("🤷🤷🤷", &catalog).text.is_empty());
        // Empty catalog still yields a reply, just with no sample.
        let reply = respond("xin chào", &[]);
        assert!(reply.courses.is_empty());
    }
}
