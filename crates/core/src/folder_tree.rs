//! Assembles flat folder and document lists into a presentation tree.
//!
//! Folders reference their parent by path; documents are placed by the
//! directory prefix of their own path (see [`crate::naming::folder_of`]).
//! Neither relationship is enforced by storage, so the builder tolerates
//! dangling parents, cycles, and documents with no matching folder.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::naming::folder_of;

/// Anything that can be placed in the tree as a folder.
pub trait TreeFolder {
    fn path(&self) -> &str;
    fn parent_path(&self) -> Option<&str>;
}

/// Anything that can be filed under a folder.
pub trait TreeDocument {
    fn path(&self) -> &str;
}

/// One folder with its subfolders and directly contained documents.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode<F, D> {
    #[serde(flatten)]
    pub folder: F,
    pub children: Vec<TreeNode<F, D>>,
    pub documents: Vec<D>,
}

/// The assembled tree plus documents that matched no folder.
#[derive(Debug, Clone, Serialize)]
pub struct FolderTree<F, D> {
    pub roots: Vec<TreeNode<F, D>>,
    pub unfiled: Vec<D>,
}

/// Build the folder tree.
///
/// A folder is a root when its parent is `None` or names a folder that does
/// not exist. Folders reachable only through a parent cycle are promoted to
/// roots so that nothing is silently dropped.
pub fn build_folder_tree<F, D>(folders: Vec<F>, documents: Vec<D>) -> FolderTree<F, D>
where
    F: TreeFolder,
    D: TreeDocument,
{
    let known: HashSet<String> = folders.iter().map(|f| f.path().to_string()).collect();

    // Documents grouped by owning folder path.
    let mut docs_by_folder: HashMap<String, Vec<D>> = HashMap::new();
    let mut unfiled = Vec::new();
    for doc in documents {
        match folder_of(doc.path()) {
            Some(folder) if known.contains(folder) => {
                docs_by_folder.entry(folder.to_string()).or_default().push(doc);
            }
            _ => unfiled.push(doc),
        }
    }

    // Folder indices grouped by parent path; roots collected separately.
    let mut children_of: HashMap<String, Vec<usize>> = HashMap::new();
    let mut root_indices = Vec::new();
    for (idx, folder) in folders.iter().enumerate() {
        match folder.parent_path() {
            Some(parent) if known.contains(parent) && parent != folder.path() => {
                children_of.entry(parent.to_string()).or_default().push(idx);
            }
            _ => root_indices.push(idx),
        }
    }

    let mut slots: Vec<Option<F>> = folders.into_iter().map(Some).collect();
    let mut placed = vec![false; slots.len()];

    let mut roots = Vec::new();
    for idx in root_indices {
        if let Some(node) =
            take_subtree(idx, &mut slots, &mut placed, &children_of, &mut docs_by_folder)
        {
            roots.push(node);
        }
    }

    // Anything not yet placed sits on a parent cycle.
    for idx in 0..slots.len() {
        if !placed[idx] {
            if let Some(node) =
                take_subtree(idx, &mut slots, &mut placed, &children_of, &mut docs_by_folder)
            {
                roots.push(node);
            }
        }
    }

    FolderTree { roots, unfiled }
}

/// Detach the folder at `idx` and everything below it into a node.
///
/// Uses an explicit stack; nodes are assembled bottom-up once all of their
/// children have been built.
fn take_subtree<F, D>(
    idx: usize,
    slots: &mut [Option<F>],
    placed: &mut [bool],
    children_of: &HashMap<String, Vec<usize>>,
    docs_by_folder: &mut HashMap<String, Vec<D>>,
) -> Option<TreeNode<F, D>>
where
    F: TreeFolder,
{
    if placed[idx] {
        return None;
    }

    // (folder index, parent position in `order`)
    let mut order: Vec<(usize, Option<usize>)> = Vec::new();
    let mut stack = vec![(idx, None)];
    while let Some((current, parent)) = stack.pop() {
        if placed[current] {
            continue;
        }
        placed[current] = true;
        let position = order.len();
        order.push((current, parent));

        let path = slots[current].as_ref().map(|f| f.path().to_string());
        if let Some(kids) = path.and_then(|p| children_of.get(&p)) {
            for &child in kids.iter().rev() {
                if !placed[child] {
                    stack.push((child, Some(position)));
                }
            }
        }
    }

    let mut built: Vec<Option<TreeNode<F, D>>> = Vec::with_capacity(order.len());
    for &(folder_idx, _) in &order {
        let folder = slots[folder_idx].take()?;
        let documents = docs_by_folder.remove(folder.path()).unwrap_or_default();
        built.push(Some(TreeNode {
            folder,
            children: Vec::new(),
            documents,
        }));
    }

    // Attach children to parents in reverse discovery order. Every node's
    // descendants come after it in `order`, so a node is complete by the time
    // it is moved; reversing restores the original sibling order.
    for position in (1..order.len()).rev() {
        if let Some(parent) = order[position].1 {
            if let Some(mut node) = built[position].take() {
                node.children.reverse();
                if let Some(parent_node) = built[parent].as_mut() {
                    parent_node.children.push(node);
                }
            }
        }
    }

    let mut root = built.into_iter().next().flatten()?;
    root.children.reverse();
    Some(root)
}
