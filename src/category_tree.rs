// src/category_tree.rs
use std::collections::HashMap;
use tracing::debug;

use crate::report_data::{Category, CategorySet};

/// One display group: a canton category set's title with its member
/// categories and the color the set is rendered in.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    pub set_title: String,
    /// First member's color represents the whole group.
    pub color: Option<String>,
    pub categories: Vec<Category>,
}

/// Groups canton categories by their owning set title. Groups are ordered for
/// display by the owning `CategorySet.order`; a title matching no set sorts
/// after all matched groups. Member categories keep the relative order they
/// arrived in; the per-category order field is not consulted.
pub fn build_category_groups(
    categories: &[Category],
    category_sets: &[CategorySet],
) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    let mut index_by_title: HashMap<&str, usize> = HashMap::new();

    for category in categories {
        if category.is_further_employment() {
            continue;
        }
        match index_by_title.get(category.category_set_title.as_str()) {
            Some(&index) => groups[index].categories.push(category.clone()),
            None => {
                index_by_title.insert(category.category_set_title.as_str(), groups.len());
                groups.push(CategoryGroup {
                    set_title: category.category_set_title.clone(),
                    color: category.color.clone(),
                    categories: vec![category.clone()],
                });
            }
        }
    }

    let order_by_title: HashMap<&str, i64> = category_sets
        .iter()
        .map(|set| (set.title.as_str(), set.order))
        .collect();
    groups.sort_by_key(|group| {
        order_by_title
            .get(group.set_title.as_str())
            .copied()
            .unwrap_or(i64::MAX)
    });

    debug!("Built {} category groups", groups.len());
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report_data::FURTHER_EMPLOYMENT_SET_TITLE;

    fn category(id: &str, title: &str, set_title: &str, color: &str) -> Category {
        Category {
            id: id.to_string(),
            title: title.to_string(),
            subtitle: None,
            color: Some(color.to_string()),
            category_set_title: set_title.to_string(),
            category_set_order: None,
            workload_percent: None,
        }
    }

    fn set(title: &str, order: i64) -> CategorySet {
        CategorySet {
            id: format!("set_{}", title),
            title: title.to_string(),
            order,
            percentage: None,
            user_percentage: None,
            min_percentage: None,
            max_percentage: None,
        }
    }

    #[test]
    fn groups_follow_category_set_order() {
        let categories = vec![
            category("a1", "Admin work", "Administration", "#aaa"),
            category("t1", "Lessons", "Teaching", "#bbb"),
        ];
        let sets = vec![set("Teaching", 1), set("Administration", 2)];

        let groups = build_category_groups(&categories, &sets);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].set_title, "Teaching");
        assert_eq!(groups[1].set_title, "Administration");
    }

    #[test]
    fn members_keep_arrival_order_within_a_group() {
        let categories = vec![
            category("t2", "Preparation", "Teaching", "#bbb"),
            category("t1", "Lessons", "Teaching", "#ccc"),
        ];
        let sets = vec![set("Teaching", 1)];

        let groups = build_category_groups(&categories, &sets);
        assert_eq!(groups.len(), 1);
        let titles: Vec<&str> = groups[0]
            .categories
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(
            titles,
            vec!["Preparation", "Lessons"],
            "arrival order must survive grouping"
        );
    }

    #[test]
    fn first_member_color_represents_the_group() {
        let categories = vec![
            category("t1", "Lessons", "Teaching", "#first"),
            category("t2", "Preparation", "Teaching", "#second"),
        ];
        let groups = build_category_groups(&categories, &[set("Teaching", 1)]);
        assert_eq!(groups[0].color.as_deref(), Some("#first"));
    }

    #[test]
    fn further_employment_categories_are_excluded() {
        let mut further = category("u1", "Side job", FURTHER_EMPLOYMENT_SET_TITLE, "#eee");
        further.workload_percent = Some(rust_decimal_macros::dec!(20));
        let categories = vec![
            category("t1", "Lessons", "Teaching", "#bbb"),
            further,
        ];
        let groups = build_category_groups(&categories, &[set("Teaching", 1)]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].set_title, "Teaching");
    }

    #[test]
    fn titles_without_a_set_sort_last() {
        let categories = vec![
            category("x1", "Stray", "Unknown set", "#000"),
            category("t1", "Lessons", "Teaching", "#bbb"),
        ];
        let groups = build_category_groups(&categories, &[set("Teaching", 1)]);
        assert_eq!(groups[0].set_title, "Teaching");
        assert_eq!(groups[1].set_title, "Unknown set");
    }
}
