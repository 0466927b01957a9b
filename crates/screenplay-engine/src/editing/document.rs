use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Screenplay block types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    SceneHeading,
    Action,
    Character,
    Dialogue,
    Parenthetical,
    Transition,
}

impl BlockType {
    pub const ALL: [BlockType; 6] = [
        BlockType::SceneHeading,
        BlockType::Action,
        BlockType::Character,
        BlockType::Dialogue,
        BlockType::Parenthetical,
        BlockType::Transition,
    ];

    /// Type of the block created when Enter is pressed on a block of this type
    pub fn next_on_enter(self) -> BlockType {
        match self {
            BlockType::SceneHeading => BlockType::Action,
            BlockType::Character => BlockType::Dialogue,
            BlockType::Dialogue => BlockType::Character,
            BlockType::Parenthetical => BlockType::Dialogue,
            BlockType::Action => BlockType::Action,
            BlockType::Transition => BlockType::Action,
        }
    }

    /// Next type in the Tab ring. Note the ring visits parenthetical before
    /// dialogue, which is not declaration order.
    pub fn cycle(self) -> BlockType {
        match self {
            BlockType::SceneHeading => BlockType::Action,
            BlockType::Action => BlockType::Character,
            BlockType::Character => BlockType::Parenthetical,
            BlockType::Parenthetical => BlockType::Dialogue,
            BlockType::Dialogue => BlockType::Transition,
            BlockType::Transition => BlockType::SceneHeading,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::SceneHeading => "scene_heading",
            BlockType::Action => "action",
            BlockType::Character => "character",
            BlockType::Dialogue => "dialogue",
            BlockType::Parenthetical => "parenthetical",
            BlockType::Transition => "transition",
        }
    }

    /// CSS class list for rendering a block of this type
    pub fn css_class(self) -> String {
        format!("block {}", self.as_str().replace('_', "-"))
    }

    /// Placeholder shown while the block is empty, e.g. "SCENE HEADING"
    pub fn placeholder_label(self) -> String {
        self.as_str().replace('_', " ").to_uppercase()
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown block type: {0}")]
pub struct ParseBlockTypeError(pub String);

impl FromStr for BlockType {
    type Err = ParseBlockTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        BlockType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == normalized)
            .ok_or_else(|| ParseBlockTypeError(s.to_string()))
    }
}

/// Stable identifier for a block, assigned once and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(Uuid);

impl BlockId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub block_type: BlockType,
    pub content: String,
}

impl Block {
    pub fn new(block_type: BlockType, content: impl Into<String>) -> Self {
        Self {
            id: BlockId::new(),
            block_type,
            content: content.into(),
        }
    }

    pub fn empty(block_type: BlockType) -> Self {
        Self::new(block_type, String::new())
    }

    /// Length of the content in characters, the unit used for cursor offsets
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("A document needs at least one block")]
    Empty,
    #[error("Duplicate block id: {0}")]
    DuplicateId(BlockId),
}

/// Uppercase scene locations already used in the document, kept ordered so
/// suggestions come out in a stable order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownLocations(BTreeSet<String>);

impl KnownLocations {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for KnownLocations {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

static HEADING_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:INT\./EXT\.|INT\.|EXT\.)").expect("heading prefix pattern is valid")
});

/// Location part of a scene heading: prefix stripped, text before the first
/// `-`, uppercased and trimmed
pub fn heading_location(heading: &str) -> Option<String> {
    let rest = HEADING_PREFIX.replace(heading, "");
    let location = rest.split('-').next().unwrap_or_default().trim();
    if location.is_empty() {
        None
    } else {
        Some(location.to_uppercase())
    }
}

/// Ordered sequence of typed blocks. Never empty, ids always unique.
///
/// Index-based mutators are total: an index outside the document leaves it
/// untouched and reports that through the return value.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A fresh document holding one empty scene heading
    pub fn new() -> Self {
        Self::with_opening_block(BlockType::SceneHeading)
    }

    pub fn with_opening_block(block_type: BlockType) -> Self {
        Self {
            blocks: vec![Block::empty(block_type)],
        }
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, DocumentError> {
        if blocks.is_empty() {
            return Err(DocumentError::Empty);
        }
        let mut seen = std::collections::HashSet::with_capacity(blocks.len());
        for block in &blocks {
            if !seen.insert(block.id) {
                return Err(DocumentError::DuplicateId(block.id));
            }
        }
        Ok(Self { blocks })
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn index_of(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| block.id == id)
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.index_of(id).is_some()
    }

    /// Insert `block` right after `index`. Rejected when the index is out of
    /// range or the block's id is already present.
    pub fn insert_after(&mut self, index: usize, block: Block) -> bool {
        if index >= self.blocks.len() || self.contains(block.id) {
            return false;
        }
        self.blocks.insert(index + 1, block);
        true
    }

    /// Remove the block at `index`, refusing to remove the last remaining one
    pub fn remove_at(&mut self, index: usize) -> Option<Block> {
        if self.blocks.len() <= 1 || index >= self.blocks.len() {
            return None;
        }
        Some(self.blocks.remove(index))
    }

    pub fn set_content(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.blocks.get_mut(index) {
            Some(block) => {
                block.content = text.into();
                true
            }
            None => false,
        }
    }

    pub fn set_type(&mut self, index: usize, block_type: BlockType) -> bool {
        match self.blocks.get_mut(index) {
            Some(block) => {
                block.block_type = block_type;
                true
            }
            None => false,
        }
    }

    pub fn known_locations(&self) -> KnownLocations {
        self.blocks
            .iter()
            .filter(|block| block.block_type == BlockType::SceneHeading)
            .filter_map(|block| heading_location(&block.content))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn doc_of(types: &[BlockType]) -> Document {
        Document::from_blocks(types.iter().map(|ty| Block::empty(*ty)).collect()).unwrap()
    }

    #[rstest]
    #[case(BlockType::SceneHeading, BlockType::Action)]
    #[case(BlockType::Character, BlockType::Dialogue)]
    #[case(BlockType::Dialogue, BlockType::Character)]
    #[case(BlockType::Parenthetical, BlockType::Dialogue)]
    #[case(BlockType::Action, BlockType::Action)]
    #[case(BlockType::Transition, BlockType::Action)]
    fn test_next_on_enter(#[case] current: BlockType, #[case] expected: BlockType) {
        assert_eq!(current.next_on_enter(), expected);
    }

    #[test]
    fn test_cycle_order() {
        let mut ty = BlockType::SceneHeading;
        let mut seen = Vec::new();
        for _ in 0..6 {
            ty = ty.cycle();
            seen.push(ty);
        }
        assert_eq!(
            seen,
            vec![
                BlockType::Action,
                BlockType::Character,
                BlockType::Parenthetical,
                BlockType::Dialogue,
                BlockType::Transition,
                BlockType::SceneHeading,
            ]
        );
    }

    #[test]
    fn test_cycle_six_times_is_identity_for_every_type() {
        for ty in BlockType::ALL {
            let cycled = (0..6).fold(ty, |acc, _| acc.cycle());
            assert_eq!(cycled, ty);
        }
    }

    #[rstest]
    #[case(BlockType::SceneHeading, "SCENE HEADING", "block scene-heading")]
    #[case(BlockType::Parenthetical, "PARENTHETICAL", "block parenthetical")]
    fn test_render_labels(#[case] ty: BlockType, #[case] label: &str, #[case] class: &str) {
        assert_eq!(ty.placeholder_label(), label);
        assert_eq!(ty.css_class(), class);
    }

    #[rstest]
    #[case("scene_heading", BlockType::SceneHeading)]
    #[case("Scene Heading", BlockType::SceneHeading)]
    #[case("dialogue", BlockType::Dialogue)]
    fn test_parse_block_type(#[case] input: &str, #[case] expected: BlockType) {
        assert_eq!(input.parse::<BlockType>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_block_type() {
        let err = "montage".parse::<BlockType>().unwrap_err();
        assert_eq!(err, ParseBlockTypeError("montage".to_string()));
    }

    #[test]
    fn test_from_blocks_rejects_empty_and_duplicates() {
        assert_eq!(Document::from_blocks(vec![]), Err(DocumentError::Empty));

        let block = Block::empty(BlockType::Action);
        let id = block.id;
        let result = Document::from_blocks(vec![block.clone(), block]);
        assert_eq!(result, Err(DocumentError::DuplicateId(id)));
    }

    #[test]
    fn test_insert_after_places_block_immediately_after() {
        let mut doc = doc_of(&[BlockType::SceneHeading, BlockType::Action]);
        let inserted = Block::new(BlockType::Character, "MARY");
        let inserted_id = inserted.id;

        assert!(doc.insert_after(0, inserted));
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.index_of(inserted_id), Some(1));
    }

    #[test]
    fn test_insert_after_rejects_out_of_range_and_duplicate_ids() {
        let mut doc = Document::new();
        assert!(!doc.insert_after(5, Block::empty(BlockType::Action)));

        let existing = doc.get(0).unwrap().clone();
        assert!(!doc.insert_after(0, existing));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_remove_never_empties_document() {
        let mut doc = doc_of(&[BlockType::Action, BlockType::Action, BlockType::Action]);
        for _ in 0..10 {
            doc.remove_at(doc.len() - 1);
        }
        assert_eq!(doc.len(), 1);
        assert!(doc.remove_at(0).is_none());
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut doc = doc_of(&[BlockType::Action, BlockType::Dialogue]);
        assert!(doc.remove_at(2).is_none());
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_set_content_and_type() {
        let mut doc = Document::new();
        assert!(doc.set_content(0, "INT. HOUSE - DAY"));
        assert!(doc.set_type(0, BlockType::Transition));
        assert!(!doc.set_content(1, "ignored"));
        assert!(!doc.set_type(1, BlockType::Action));

        let block = doc.get(0).unwrap();
        assert_eq!(block.content, "INT. HOUSE - DAY");
        assert_eq!(block.block_type, BlockType::Transition);
    }

    #[test]
    fn test_ids_are_unique_across_creation() {
        let a = Block::empty(BlockType::Action);
        let b = Block::empty(BlockType::Action);
        assert_ne!(a.id, b.id);
    }

    #[rstest]
    #[case("INT. COFFEE SHOP - DAY", Some("COFFEE SHOP"))]
    #[case("ext. park - night", Some("PARK"))]
    #[case("INT./EXT. CAR - MOVING", Some("CAR"))]
    #[case("  INT.   KITCHEN  ", Some("KITCHEN"))]
    #[case("OFFICE - LATER", Some("OFFICE"))]
    #[case("INT. ", None)]
    #[case("", None)]
    #[case("EXT. - DAY", None)]
    fn test_heading_location(#[case] heading: &str, #[case] expected: Option<&str>) {
        assert_eq!(heading_location(heading).as_deref(), expected);
    }

    #[test]
    fn test_known_locations_only_from_scene_headings() {
        let doc = Document::from_blocks(vec![
            Block::new(BlockType::SceneHeading, "INT. COFFEE SHOP - DAY"),
            Block::new(BlockType::Action, "EXT. NOT A HEADING - DAY"),
            Block::new(BlockType::SceneHeading, "ext. park - night"),
            Block::new(BlockType::SceneHeading, "INT. COFFEE SHOP - NIGHT"),
        ])
        .unwrap();

        let known = doc.known_locations();
        let locations: Vec<&str> = known.iter().collect();
        assert_eq!(locations, vec!["COFFEE SHOP", "PARK"]);
    }
}
