use std::collections::HashMap;

use crate::model::LineItem;

/// A run of line items sharing one `(date, category)` key, rendered under
/// a single section-header row in the table.
#[derive(Debug)]
pub struct Section<'a> {
    pub date: &'a str,
    pub category: &'a str,
    pub items: Vec<&'a LineItem>,
}

/// Group items by `(date, category)` preserving first-occurrence order.
///
/// A key's position is fixed by the first row that carries it; later rows
/// with the same key are appended to the existing section even when they
/// are not adjacent in the input. Single pass, O(n).
pub fn group_items(items: &[LineItem]) -> Vec<Section<'_>> {
    let mut sections: Vec<Section<'_>> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();

    for item in items {
        let key = (item.date.as_str(), item.category.as_str());
        match index.get(&key) {
            Some(&i) => sections[i].items.push(item),
            None => {
                index.insert(key, sections.len());
                sections.push(Section {
                    date: &item.date,
                    category: &item.category,
                    items: vec![item],
                });
            }
        }
    }
    sections
}
