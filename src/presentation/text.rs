//! User-facing phrases for the site counts block.

/// Pick the singular form for exactly one, the plural form otherwise.
pub fn plural<'a>(count: u64, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

pub fn type_count_line(count: u64, label: &str) -> String {
    let verb = plural(count, "is", "are");
    format!("There {verb} {count} {label}.")
}

pub fn current_item_line(current_id: i64) -> String {
    format!("The current post ID is {current_id}.")
}

pub fn cat_tag_heading(count: u64) -> String {
    let noun = plural(count, "post", "posts");
    format!("{count} {noun} with the tag of foo and the category of baz")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_lines_use_singular_phrase_only_for_one() {
        assert_eq!(type_count_line(1, "post"), "There is 1 post.");
        assert_eq!(type_count_line(0, "page"), "There are 0 page.");
        assert_eq!(type_count_line(5, "products"), "There are 5 products.");
    }

    #[test]
    fn heading_pluralizes_on_count() {
        assert_eq!(
            cat_tag_heading(1),
            "1 post with the tag of foo and the category of baz"
        );
        assert_eq!(
            cat_tag_heading(4),
            "4 posts with the tag of foo and the category of baz"
        );
    }
}
