//! Directory entities.

/// A person who receives a department's mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// Full legal name.
    pub full_name: String,
    /// Code of the owning department.
    pub department_code: String,
    /// Display name of the owning department, as written on the row.
    pub department_name: String,
    /// Short name shown to the operator.
    pub short_name: String,
    /// Whether this recipient is copied rather than addressed directly.
    pub cc: bool,
    /// Email address.
    pub address: String,
    /// Free-text note.
    pub note: String,
}

impl Recipient {
    /// Label shown in selection lists: `Al(a@x.com)` or `Al(cc, a@x.com)`.
    #[must_use]
    pub fn label(&self) -> String {
        if self.cc {
            format!("{}(cc, {})", self.short_name, self.address)
        } else {
            format!("{}({})", self.short_name, self.address)
        }
    }
}

/// A unit that owns recipients and belongs to one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    /// Unique department code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Recipients in roster order.
    pub recipients: Vec<Recipient>,
}

impl Department {
    /// `"<code>: <name>"`.
    #[must_use]
    pub fn identity(&self) -> String {
        format!("{}: {}", self.code, self.name)
    }
}

/// A top-level unit aggregating departments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Unique group code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Member departments in first-appearance order.
    pub departments: Vec<Department>,
}

impl Group {
    /// `"<code>-<name>"`, used in log lines and prompts.
    #[must_use]
    pub fn identity(&self) -> String {
        format!("{}-{}", self.code, self.name)
    }

    /// Member departments as `"D1: Math, D2: Physics"`.
    #[must_use]
    pub fn department_summary(&self) -> String {
        self.departments
            .iter()
            .map(Department::identity)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Every recipient label across member departments.
    #[must_use]
    pub fn recipient_summary(&self) -> String {
        self.departments
            .iter()
            .flat_map(|d| &d.recipients)
            .map(Recipient::label)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Number of recipients across member departments.
    #[must_use]
    pub fn recipient_count(&self) -> usize {
        self.departments.iter().map(|d| d.recipients.len()).sum()
    }
}

/// Entity counts, for the load summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectoryCounts {
    /// Number of groups.
    pub groups: usize,
    /// Number of departments.
    pub departments: usize,
    /// Number of recipients.
    pub recipients: usize,
}

/// The loaded, read-only directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    groups: Vec<Group>,
}

impl Directory {
    pub(crate) const fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    /// Groups in construction order.
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Group at `index`, if any.
    #[must_use]
    pub fn group(&self, index: usize) -> Option<&Group> {
        self.groups.get(index)
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true when no group was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Counts of groups, departments and recipients.
    #[must_use]
    pub fn counts(&self) -> DirectoryCounts {
        DirectoryCounts {
            groups: self.groups.len(),
            departments: self.groups.iter().map(|g| g.departments.len()).sum(),
            recipients: self.groups.iter().map(Group::recipient_count).sum(),
        }
    }
}
