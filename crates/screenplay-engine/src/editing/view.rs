use crate::editing::controller::EditorState;
use crate::editing::document::{BlockId, BlockType};

/// Per-block data a frontend renders
#[derive(Debug, Clone, PartialEq)]
pub struct BlockView {
    pub id: BlockId,
    pub block_type: BlockType,
    pub content: String,
    pub class: String,
    pub placeholder: String,
    pub focused: bool,
}

impl EditorState {
    pub fn block_views(&self) -> Vec<BlockView> {
        self.document()
            .iter()
            .map(|block| BlockView {
                id: block.id,
                block_type: block.block_type,
                content: block.content.clone(),
                class: block.block_type.css_class(),
                placeholder: block.block_type.placeholder_label(),
                focused: self.focused() == Some(block.id),
            })
            .collect()
    }
}
