//! Organization unit models
//!
//! Organization units form the department tree of a tenant. Each unit
//! carries a dotted hierarchical code (`00001.00003.00002`) that encodes its
//! position, so subtree queries can be answered with a prefix match.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use uuid::Uuid;

use console_tree::{BaseNode, NodeId, TreeAdapter, TreeError, TreeResult};

/// Number of digits in one code segment.
pub const CODE_UNIT_LENGTH: usize = 5;

/// A node of the organization tree.
///
/// # Examples
///
/// ```
/// use console_org::OrganizationUnit;
///
/// let root = OrganizationUnit::new("Head Office", "00001");
/// let sales = root.create_child("Sales", "00001.00001");
/// assert_eq!(sales.parent_id.as_deref(), Some(root.id.as_str()));
/// assert!(sales.is_under(&root));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationUnit {
    /// Unique identifier (UUID v7)
    pub id: String,

    /// Parent unit, `None` for a top-level unit
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Hierarchical position code
    pub code: String,

    /// Name shown in the tree
    pub display_name: String,

    /// When the unit was created
    pub created_at: DateTime<Utc>,

    /// When the unit was last updated
    pub updated_at: DateTime<Utc>,

    /// Custom metadata for extensibility
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl OrganizationUnit {
    /// Creates a new top-level unit.
    ///
    /// # Arguments
    ///
    /// * `display_name` - The unit name
    /// * `code` - Hierarchical code, usually from [`next_child_code`]
    pub fn new(display_name: impl Into<String>, code: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7().to_string(),
            parent_id: None,
            code: code.into(),
            display_name: display_name.into(),
            created_at: now,
            updated_at: now,
            metadata: HashMap::new(),
        }
    }

    /// Creates a unit under this one.
    pub fn create_child(&self, display_name: impl Into<String>, code: impl Into<String>) -> Self {
        let mut child = Self::new(display_name, code);
        child.parent_id = Some(self.id.clone());
        child
    }

    /// Builds a code from the parent code and a 1-based sibling number.
    ///
    /// # Examples
    ///
    /// ```
    /// use console_org::OrganizationUnit;
    ///
    /// assert_eq!(OrganizationUnit::code_for(None, 1), "00001");
    /// assert_eq!(OrganizationUnit::code_for(Some("00001"), 12), "00001.00012");
    /// ```
    pub fn code_for(parent_code: Option<&str>, number: u32) -> String {
        let segment = format!("{:0width$}", number, width = CODE_UNIT_LENGTH);
        match parent_code {
            Some(parent) if !parent.is_empty() => format!("{parent}.{segment}"),
            _ => segment,
        }
    }

    /// Sibling number encoded in the last segment of a code.
    pub fn last_segment(code: &str) -> Option<u32> {
        code.rsplit('.').next().and_then(|s| s.parse().ok())
    }

    /// Code of the parent, `None` for a top-level code.
    pub fn parent_code(code: &str) -> Option<&str> {
        code.rsplit_once('.').map(|(parent, _)| parent)
    }

    /// Check if this unit sits anywhere below `ancestor` by code.
    pub fn is_under(&self, ancestor: &OrganizationUnit) -> bool {
        self.code.len() > ancestor.code.len()
            && self.code.starts_with(&ancestor.code)
            && self.code.as_bytes()[ancestor.code.len()] == b'.'
    }

    /// Sibling number if `code` is a direct child code of `parent_code`.
    fn number_under(&self, parent_code: Option<&str>) -> Option<u32> {
        if Self::parent_code(&self.code) != parent_code.filter(|p| !p.is_empty()) {
            return None;
        }
        let segment = self.code.rsplit('.').next()?;
        if segment.len() != CODE_UNIT_LENGTH || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        segment.parse().ok().filter(|&n| n > 0)
    }
}

impl BaseNode for OrganizationUnit {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    fn set_parent_id(&mut self, parent_id: Option<String>) {
        self.parent_id = parent_id;
        self.updated_at = Utc::now();
    }

    fn display_name(&self) -> Option<&str> {
        Some(&self.display_name)
    }
}

/// Code for a new last child of `parent_id` (`None` for a top-level unit).
///
/// Returns [`TreeError::NodeNotFound`] if the parent is not in the tree.
pub fn next_child_code(
    adapter: &TreeAdapter<OrganizationUnit>,
    parent_id: Option<&str>,
) -> TreeResult<String> {
    let forest = adapter.get_tree();
    let (parent_code, siblings): (Option<&str>, &[NodeId]) = match parent_id {
        Some(key) => {
            let id = forest
                .id_of(key)
                .ok_or_else(|| TreeError::NodeNotFound(key.to_string()))?;
            let code = forest.get(id).map(|n| n.entity.code.as_str());
            (code, forest.children(id))
        }
        None => (None, forest.roots()),
    };

    let last = siblings
        .iter()
        .filter_map(|&id| forest.get(id))
        .filter_map(|n| n.entity.number_under(parent_code))
        .max()
        .unwrap_or(0);

    Ok(OrganizationUnit::code_for(parent_code, last + 1))
}

/// Reassign codes so that every unit's code extends its parent's.
///
/// Units whose code is already a well-formed, unique child code of their
/// parent keep it. Others (typically a moved subtree) get the next free
/// number under their new parent. Returns the units whose code changed,
/// parents before children, so the caller can persist them and feed them
/// back through [`TreeAdapter::update_node`].
pub fn recompute_codes(adapter: &TreeAdapter<OrganizationUnit>) -> Vec<OrganizationUnit> {
    let forest = adapter.get_tree();
    let now = Utc::now();
    let mut changed = Vec::new();

    let mut queue: VecDeque<(Option<String>, &[NodeId])> = VecDeque::new();
    queue.push_back((None, forest.roots()));

    while let Some((parent_code, siblings)) = queue.pop_front() {
        let nodes: Vec<_> = siblings.iter().filter_map(|&id| forest.get(id)).collect();

        let mut used = HashSet::new();
        let kept: Vec<Option<u32>> = nodes
            .iter()
            .map(|n| {
                n.entity
                    .number_under(parent_code.as_deref())
                    .filter(|&number| used.insert(number))
            })
            .collect();
        let mut next = used.iter().copied().max().unwrap_or(0) + 1;

        for (node, kept) in nodes.into_iter().zip(kept) {
            let number = kept.unwrap_or_else(|| {
                let number = next;
                next += 1;
                number
            });
            let code = OrganizationUnit::code_for(parent_code.as_deref(), number);
            if code != node.entity.code {
                let mut unit = node.entity.clone();
                unit.code = code.clone();
                unit.updated_at = now;
                changed.push(unit);
            }
            queue.push_back((Some(code), &node.children));
        }
    }

    tracing::debug!(changed = changed.len(), "Organization unit codes recomputed");
    changed
}
