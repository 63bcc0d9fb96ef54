//! Layered merge of default, template and per-domain targets.
//!
//! ```text
//! default (complete) ─▶ template (partial) ─▶ domain override (partial)
//!                      later layers win, field by field
//! ```

use crate::resolve::target::TargetSet;

/// Merge up to three layers into one effective target set.
///
/// Starts from a copy of `base`, then applies `template` and `override_`
/// in that order. Template lookup by name is the caller's job; this
/// function never recurses into `override_.template`.
///
/// When `base` is complete the result is complete, since layers only
/// replace entries.
pub fn merge(
    base: &TargetSet,
    template: Option<&TargetSet>,
    override_: Option<&TargetSet>,
) -> TargetSet {
    let mut merged = base.clone();
    merged.template = None;

    for layer in [template, override_].into_iter().flatten() {
        merged.apply(layer);
    }

    merged
}
