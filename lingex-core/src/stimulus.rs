use serde::{Deserialize, Serialize};

/// Defines stimuli and how they are rendered onto a screen
pub trait Stimulus: Clone + Send + Sync + std::fmt::Debug {
    fn render(&self) -> String;
}

/// A scenario followed by the judgment prompt asked about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StimulusItem {
    pub id: usize,
    pub scenario: &'static str,
    pub prompt: &'static str,
}

impl StimulusItem {
    pub const fn new(id: usize, scenario: &'static str, prompt: &'static str) -> Self {
        Self {
            id,
            scenario,
            prompt,
        }
    }

    pub fn to_ref(&self) -> StimulusRef {
        StimulusRef {
            item_id: self.id,
            scenario: self.scenario.to_string(),
            prompt: self.prompt.to_string(),
        }
    }
}

impl Stimulus for StimulusItem {
    fn render(&self) -> String {
        format!("{} {}", self.scenario, self.prompt)
    }
}

/// Owned copy of a stimulus stored alongside the judgment it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StimulusRef {
    pub item_id: usize,
    pub scenario: String,
    pub prompt: String,
}

/// The full catalog, in authoring order.
pub fn catalog() -> &'static [StimulusItem] {
    &CATALOG
}

static CATALOG: [StimulusItem; 20] = [
    StimulusItem::new(
        0,
        "There are two ways to get $5 from Mr. Johnson: mowing his lawn or cleaning his gutters. Laura believes Mr. Johnson will only give you $5 for mowing his lawn. Laura tells you: “If you mow Mr. Johnson’s lawn, he’ll pay you $5.”",
        "Do you think Laura would accept the following statement: <b>“If you don’t mow Mr. Johnson’s lawn, he won’t pay you $5.”</b>",
    ),
    StimulusItem::new(
        1,
        "There are two ways to get $5 from Mr. Johnson: mowing his lawn or cleaning his gutters. Laura knows that Mr. Johnson will give you $5 for both mowing his lawn and cleaning his gutters. Laura tells you: “If you mow Mr. Johnson’s lawn, he’ll pay you $5.”",
        "Do you think Laura would accept the following statement: <b>“If you don’t mow Mr. Johnson’s lawn, he won’t pay you $5.”</b>",
    ),
    StimulusItem::new(
        2,
        "There are two ways to get $5 from Mr. Johnson: mowing his lawn or cleaning his gutters. Laura believes Mr. Johnson will only give you $5 for mowing his lawn. Laura tells you: “Mr. John will pay you $5 for mowing his lawn.”",
        "Do you think Laura would accept the following statement: <b>“If you don’t mow Mr. Johnson’s lawn, he won’t pay you $5.”</b>",
    ),
    StimulusItem::new(
        3,
        "There are two ways to get $5 from Mr. Johnson: mowing his lawn or cleaning his gutters. Laura knows that Mr. Johnson will give you $5 for both mowing his lawn and cleaning his gutters. Laura tells you: “Mr. John will pay you $5 for mowing his lawn.”",
        "Do you think Laura would accept the following statement: <b>“If you don’t mow Mr. Johnson’s lawn, he won’t pay you $5.”</b>",
    ),
    StimulusItem::new(
        4,
        "There are two ways Susie’s goldfish can get sick: if she stops feeding it or cleaning its tank. Susie has stopped doing either, but her father only knows that she’s stopped cleaning the goldfish’s tank. Her father tells you: “If Susie doesn’t start cleaning the fish tank, she’ll make her goldfish sick.”",
        "Do you think Susie’s father would accept the following statement: <b>“If Susie starts cleaning the fish tank, she won’t make her goldfish sick.”</b>",
    ),
    StimulusItem::new(
        5,
        "There are two ways Susie’s goldfish can get sick: if she stops feeding it or cleaning its tank. Susie’s father knows that she hasn’t been doing either. Her father tells you: “If Susie doesn’t start cleaning the fish tank, she’ll make her goldfish sick.”",
        "Do you think Susie’s father would accept the following statement: <b>“If Susie starts cleaning the fish tank, she won’t make her goldfish sick.”</b>",
    ),
    StimulusItem::new(
        6,
        "There are two ways Susie’s goldfish can get sick: if she stops feeding it or cleaning its tank. Susie has stopped doing either, but her father only knows that she’s stopped cleaning the goldfish’s tank. He tells you: “Susie will make her goldfish sick by not cleaning its tank.”",
        "Do you think Susie’s father would accept the following statement: <b>“If Susie starts cleaning the fish tank, she won’t make her goldfish sick.”</b>",
    ),
    StimulusItem::new(
        7,
        "There are two ways Susie’s goldfish can get sick: if she stops feeding it or cleaning its tank. Susie’s father knows that she hasn’t been doing either. Her father tells you: “Susie will make her goldfish sick by not cleaning its tank.”",
        "Do you think Susie’s father would accept the following statement: <b>“If Susie starts cleaning the fish tank, she won’t make her goldfish sick.”</b>",
    ),
    StimulusItem::new(
        8,
        "Billy and Susie were both throwing rocks at Mrs. Smith’s vase. However, Mrs. Smith only saw Billy throwing rocks. Mrs. Smith tells you: “Billy will break my vase by throwing rocks.”",
        "Do you think Mrs. Smith would accept the following statement: <b>“If Billy stops throwing rocks at her vase, it won’t break.”</b>",
    ),
    StimulusItem::new(
        9,
        "Billy and Susie were both throwing rocks at Mrs. Smith’s vase. However, Mrs. Smith saw both Billy and Susie throwing rocks. Mrs. Smith tells you: “Billy will break my vase by throwing rocks.”",
        "Do you think Mrs. Smith would accept the following statement: <b>“If Billy stops throwing rocks at her vase, it won’t break.”</b>",
    ),
    StimulusItem::new(
        10,
        "Billy and Susie were both throwing rocks at Mrs. Smith’s vase. However, Mrs. Smith only saw Billy throwing rocks. Mrs. Smith tells you: “If Billy keeps throwing rocks, he will break my vase.”",
        "Do you think Mrs. Smith would accept the following statement: <b>“If Billy stops throwing rocks at her vase, it won’t break.”</b>",
    ),
    StimulusItem::new(
        11,
        "Billy and Susie were both throwing rocks at Mrs. Smith’s vase. However, Mrs. Smith saw both Billy and Susie throwing rocks. Mrs. Smith tells you: “If Billy keeps throwing rocks, he will break my vase.”",
        "Do you think Mrs. Smith would accept the following statement: <b>“If Billy stops throwing rocks at her vase, it won’t break.”</b>",
    ),
    StimulusItem::new(
        12,
        "There are two ways John’s eucalyptus tree can die: if it isn’t watered frequently, or if it doesn’t receive enough sunlight. John’s plant sitter has watered the tree infrequently and placed it in the shade. John only knows that the eucalyptus tree has been watered infrequently. John tells you: “If my plant-sitter doesn’t water my eucalyptus tree more often, it will die.”",
        "Do you think John would accept the following statement: <b>“If my plant-sitter doesn’t water my eucalyptus tree more often, it will die.”</b>",
    ),
    StimulusItem::new(
        13,
        "There are two ways John’s eucalyptus tree can die: if it isn’t watered frequently, or if it doesn’t receive enough sunlight. John’s plant-sitter has watered the tree infrequently and placed it in the shade. John knows that the plant-sitter has done both of these things. John tells you: “If my plant-sitter doesn’t water my eucalyptus tree more often, it will die.”",
        "Do you think John would accept the following statement: <b>“If my plant-sitter doesn’t water my eucalyptus tree more often, it will die.”</b>",
    ),
    StimulusItem::new(
        14,
        "There are two ways John’s eucalyptus tree can die: if it isn’t watered frequently, or if it doesn’t receive enough sunlight. John’s plant sitter has watered the tree infrequently and placed it in the shade. John only knows that the eucalyptus tree has been watered infrequently. John tells you: “My plant-sitter will kill the eucalyptus tree by watering it infrequently.”",
        "Do you think John would accept the following statement: <b>“If my plant-sitter doesn’t water my eucalyptus tree more often, it will die.”</b>",
    ),
    StimulusItem::new(
        15,
        "There are two ways John’s eucalyptus tree can die: if it isn’t watered frequently, or if it doesn’t receive enough sunlight. John’s plant-sitter has watered the tree infrequently and placed it in the shade. John knows that the plant-sitter has done both of these things. John tells you: “My plant-sitter will kill the eucalyptus tree by watering it infrequently.”",
        "Do you think John would accept the following statement: <b>“If my plant-sitter doesn’t water my eucalyptus tree more often, it will die.”</b>",
    ),
    StimulusItem::new(
        16,
        "There are two ways Bert can annoy Ernie: he can tap his foot and he can hum. Oscar sees that Bert is currently doing both. Oscar tells you: “Bert tapping his foot will annoy Ernie.”",
        "Do you think Oscar would accept the following statement: <b>“If Bert stops tapping his foot, Ernie won’t be annoyed.”</b>",
    ),
    StimulusItem::new(
        17,
        "There are two ways Bert can annoy Ernie: he can tap his foot and he can hum. Bert is currently doing both, but Oscar only sees Bert tapping his foot. Oscar tells you: “Bert tapping his foot will annoy Ernie.”",
        "Do you think Oscar would accept the following statement: <b>“If Bert stops tapping his foot, Ernie won’t be annoyed.”</b>",
    ),
    StimulusItem::new(
        18,
        "There are two ways Bert can annoy Ernie: he can tap his foot and he can hum. Oscar sees that Bert is currently doing both. Oscar tells you: “If Bert doesn’t stop tapping his foot, Ernie will be annoyed.”",
        "Do you think Oscar would accept the following statement: <b>“If Bert stops tapping his foot, Ernie won’t be annoyed.”</b>",
    ),
    StimulusItem::new(
        19,
        "There are two ways Bert can annoy Ernie: he can tap his foot and he can hum. Bert is currently doing both, but Oscar only sees Bert tapping his foot. Oscar tells you: “If Bert doesn’t stop tapping his foot, Ernie will be annoyed.”",
        "Do you think Oscar would accept the following statement: <b>“If Bert stops tapping his foot, Ernie won’t be annoyed.”</b>",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_entries_are_non_empty() {
        assert!(!catalog().is_empty());
        for item in catalog() {
            assert!(!item.scenario.trim().is_empty(), "item {} scenario", item.id);
            assert!(!item.prompt.trim().is_empty(), "item {} prompt", item.id);
        }
    }

    #[test]
    fn render_joins_with_exactly_one_space() {
        for item in catalog() {
            let rendered = item.render();
            assert_eq!(rendered.len(), item.scenario.len() + 1 + item.prompt.len());
            assert!(rendered.starts_with(item.scenario));
            assert!(rendered.ends_with(item.prompt));
            assert_eq!(&rendered[item.scenario.len()..item.scenario.len() + 1], " ");
        }
    }

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<usize> = catalog().iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), catalog().len());
    }

    #[test]
    fn stimulus_ref_copies_texts() {
        let item = &catalog()[3];
        let r = item.to_ref();
        assert_eq!(r.item_id, 3);
        assert_eq!(r.scenario, item.scenario);
        assert_eq!(r.prompt, item.prompt);
    }
}
