//! # Permission grants
//!
//! Permission definitions arrive from the server as a flat list where each
//! grant names its parent permission. The [`PermissionTreeEditor`] arranges
//! them into a checkbox tree, applies the user's toggles and reports the
//! grants that differ from what was loaded.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use console_tree::{BaseNode, CheckState, CheckedKeys, TreeAdapter, TreeResult};

/// One permission and whether it is currently granted.
///
/// # Example
///
/// ```
/// use console_org::permission::PermissionGrant;
///
/// let grant = PermissionGrant::new("Identity.Users.Create", "Create")
///     .with_parent("Identity.Users")
///     .granted(true);
/// assert!(grant.is_granted);
/// assert!(grant.is_allowed_for("R"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGrant {
    /// Permission name, unique across the application
    pub name: String,

    /// Name of the parent permission
    #[serde(default)]
    pub parent_name: Option<String>,

    /// Localized name
    pub display_name: String,

    /// Whether the permission is granted to the edited principal
    #[serde(default)]
    pub is_granted: bool,

    /// Providers that may grant this permission. Empty means any.
    #[serde(default)]
    pub allowed_providers: Vec<String>,
}

impl PermissionGrant {
    /// Create an ungranted top-level permission.
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_name: None,
            display_name: display_name.into(),
            is_granted: false,
            allowed_providers: Vec::new(),
        }
    }

    /// Set the parent permission.
    pub fn with_parent(mut self, parent_name: impl Into<String>) -> Self {
        self.parent_name = Some(parent_name.into());
        self
    }

    /// Set the granted flag.
    pub fn granted(mut self, is_granted: bool) -> Self {
        self.is_granted = is_granted;
        self
    }

    /// Restrict the providers that may grant this permission.
    pub fn with_providers<I, S>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_providers = providers.into_iter().map(Into::into).collect();
        self
    }

    /// Check if `provider` (e.g. `"R"` for roles, `"U"` for users) may grant
    /// this permission.
    pub fn is_allowed_for(&self, provider: &str) -> bool {
        self.allowed_providers.is_empty() || self.allowed_providers.iter().any(|p| p == provider)
    }
}

impl BaseNode for PermissionGrant {
    fn id(&self) -> &str {
        &self.name
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_name.as_deref()
    }

    fn set_parent_id(&mut self, parent_id: Option<String>) {
        self.parent_name = parent_id;
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn display_name(&self) -> Option<&str> {
        Some(&self.display_name)
    }
}

/// A grant that differs from the loaded state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionChange {
    /// Permission name
    pub name: String,
    /// New granted value
    pub is_granted: bool,
}

/// Checkbox tree over a set of permission grants.
///
/// In cascade mode a permission counts as granted while it is checked or
/// indeterminate, so a parent stays granted as long as any child is. In
/// strict mode every permission is independent.
///
/// # Example
///
/// ```
/// use console_org::permission::{PermissionChange, PermissionGrant, PermissionTreeEditor};
///
/// let mut editor = PermissionTreeEditor::new(
///     vec![
///         PermissionGrant::new("Users", "Users"),
///         PermissionGrant::new("Users.Create", "Create").with_parent("Users"),
///         PermissionGrant::new("Users.Delete", "Delete").with_parent("Users"),
///     ],
///     false,
/// );
///
/// editor.toggle("Users.Create").unwrap();
/// assert_eq!(
///     editor.changes(),
///     vec![
///         PermissionChange { name: "Users".to_string(), is_granted: true },
///         PermissionChange { name: "Users.Create".to_string(), is_granted: true },
///     ]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct PermissionTreeEditor {
    adapter: TreeAdapter<PermissionGrant>,
    keys: CheckedKeys,
    original: HashMap<String, bool>,
    strict: bool,
}

impl PermissionTreeEditor {
    /// Build the tree and seed the checkboxes from the loaded grants.
    ///
    /// In cascade mode only granted leaves seed the checkboxes; parent
    /// states are derived from them. The seeded state is the baseline for
    /// [`PermissionTreeEditor::changes`], so a freshly loaded editor reports
    /// nothing even when the server flags on parents disagree with their
    /// children.
    pub fn new(grants: Vec<PermissionGrant>, strict: bool) -> Self {
        let adapter = TreeAdapter::new(grants);
        let keys = Self::seed(&adapter, strict);
        let mut editor = Self {
            adapter,
            keys,
            original: HashMap::new(),
            strict,
        };
        editor.original = editor.snapshot();

        let normalized = editor
            .adapter
            .get_list()
            .iter()
            .filter(|g| editor.original.get(&g.name) != Some(&g.is_granted))
            .count();
        if normalized > 0 {
            tracing::debug!(normalized, "Loaded grants normalized by the checkbox cascade");
        }
        editor
    }

    fn snapshot(&self) -> HashMap<String, bool> {
        let forest = self.adapter.get_tree();
        forest
            .pre_order()
            .filter_map(|id| forest.get(id))
            .map(|n| (n.key.clone(), self.is_granted(&n.key)))
            .collect()
    }

    /// Build an editor over the grants `provider` is allowed to change.
    pub fn for_provider(grants: Vec<PermissionGrant>, provider: &str, strict: bool) -> Self {
        let grants: Vec<_> = grants.into_iter().filter(|g| g.is_allowed_for(provider)).collect();
        Self::new(grants, strict)
    }

    fn seed(adapter: &TreeAdapter<PermissionGrant>, strict: bool) -> CheckedKeys {
        let forest = adapter.get_tree();
        let seeds = forest
            .pre_order()
            .filter_map(|id| forest.get(id))
            .filter(|n| n.entity.is_granted && (strict || n.is_leaf()))
            .map(|n| n.key.clone());
        CheckedKeys::conduct(forest, seeds, strict)
    }

    /// The underlying adapter.
    pub fn adapter(&self) -> &TreeAdapter<PermissionGrant> {
        &self.adapter
    }

    /// Current checkbox state.
    pub fn checked_keys(&self) -> &CheckedKeys {
        &self.keys
    }

    /// Checkbox state of one permission.
    pub fn state(&self, name: &str) -> CheckState {
        self.keys.state(name)
    }

    /// Whether a permission would be saved as granted.
    pub fn is_granted(&self, name: &str) -> bool {
        match self.keys.state(name) {
            CheckState::Checked => true,
            CheckState::Indeterminate => !self.strict,
            CheckState::Unchecked => false,
        }
    }

    /// Grant or revoke a permission.
    pub fn set_granted(&mut self, name: &str, granted: bool) -> TreeResult<()> {
        self.keys
            .set_checked(self.adapter.get_tree(), name, granted, self.strict)?;
        tracing::debug!(permission = %name, granted, "Permission toggled");
        Ok(())
    }

    /// Flip a permission. Returns the new checked value.
    pub fn toggle(&mut self, name: &str) -> TreeResult<bool> {
        let checked = self.keys.toggle(self.adapter.get_tree(), name, self.strict)?;
        tracing::debug!(permission = %name, granted = checked, "Permission toggled");
        Ok(checked)
    }

    /// Grant or revoke every permission.
    pub fn set_all(&mut self, granted: bool) {
        let forest = self.adapter.get_tree();
        let keys: Vec<String> = if granted {
            forest.pre_order().filter_map(|id| forest.get(id)).map(|n| n.key.clone()).collect()
        } else {
            Vec::new()
        };
        self.keys = CheckedKeys::conduct(forest, keys, self.strict);
    }

    /// Discard all toggles.
    pub fn reset(&mut self) {
        self.keys = Self::seed(&self.adapter, self.strict);
    }

    /// Grants that differ from the state seeded at load, in tree order.
    pub fn changes(&self) -> Vec<PermissionChange> {
        let forest = self.adapter.get_tree();
        forest
            .pre_order()
            .filter_map(|id| forest.get(id))
            .filter_map(|n| {
                let is_granted = self.is_granted(&n.key);
                let was_granted = self.original.get(&n.key).copied().unwrap_or(false);
                (is_granted != was_granted).then(|| PermissionChange {
                    name: n.key.clone(),
                    is_granted,
                })
            })
            .collect()
    }

    /// Check if anything differs from the loaded state.
    pub fn has_changes(&self) -> bool {
        !self.changes().is_empty()
    }
}
