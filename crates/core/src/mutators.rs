//! Field mutators: the only way answer fields change in response to a user
//! action. Each one returns what happened so callers can decide whether to
//! persist and which notice to show.

use crate::model::{Answers, FieldKey, FieldKind, Selection};

/// Effect of applying a user action to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Changed,
    Unchanged,
    /// An add was refused because the field already holds `limit` members.
    LimitReached { limit: usize },
}

impl Mutation {
    #[must_use]
    pub fn is_changed(self) -> bool {
        matches!(self, Mutation::Changed)
    }
}

/// Overwrites a single-choice slot.
pub fn set_single(slot: &mut Option<String>, value: &str) -> Mutation {
    if slot.as_deref() == Some(value) {
        return Mutation::Unchanged;
    }
    *slot = Some(value.to_owned());
    Mutation::Changed
}

/// Removes `value` if present, adds it otherwise.
pub fn toggle_multi(selection: &mut Selection, value: &str) -> Mutation {
    if !selection.remove(value) {
        selection.insert(value);
    }
    Mutation::Changed
}

/// Like [`toggle_multi`], but refuses to grow past `limit` members.
pub fn toggle_multi_limited(selection: &mut Selection, value: &str, limit: usize) -> Mutation {
    if selection.remove(value) {
        return Mutation::Changed;
    }
    if selection.len() >= limit {
        return Mutation::LimitReached { limit };
    }
    selection.insert(value);
    Mutation::Changed
}

/// Toggle where `sentinel` excludes every other member.
///
/// Picking the sentinel replaces the selection with `{sentinel}`; picking
/// anything else drops the sentinel first and then toggles the value.
pub fn toggle_exclusive(selection: &mut Selection, value: &str, sentinel: &str) -> Mutation {
    if value == sentinel {
        selection.replace_with(sentinel);
        return Mutation::Changed;
    }
    selection.remove(sentinel);
    toggle_multi(selection, value)
}

/// Dispatches a user pick on `field` to the mutator for its declared kind.
///
/// Returns `Mutation::Unchanged` when the kind does not match the field's
/// storage (a single-choice kind on a set field or the reverse).
pub fn apply(answers: &mut Answers, field: FieldKey, kind: &FieldKind, value: &str) -> Mutation {
    match kind {
        FieldKind::Single => match answers.single_mut(field) {
            Some(slot) => set_single(slot, value),
            None => Mutation::Unchanged,
        },
        FieldKind::Multi => match answers.selection_mut(field) {
            Some(selection) => toggle_multi(selection, value),
            None => Mutation::Unchanged,
        },
        FieldKind::MultiLimited { limit } => match answers.selection_mut(field) {
            Some(selection) => toggle_multi_limited(selection, value, *limit),
            None => Mutation::Unchanged,
        },
        FieldKind::MultiExclusive { sentinel } => match answers.selection_mut(field) {
            Some(selection) => toggle_exclusive(selection, value, sentinel),
            None => Mutation::Unchanged,
        },
    }
}
