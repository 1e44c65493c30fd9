//! The users filter pipeline.

use pipeline::filters::{ExactMatch, Limit, NumericRange, Search, Sort};
use pipeline::FilterPipeline;

/// Largest `limit` a listing request may ask for
pub const MAX_LIMIT: usize = 1000;

/// Fields a listing may be sorted on
pub const SORTABLE_FIELDS: [&str; 4] = ["id", "name", "age", "role"];

/// Build the pipeline that narrows user listings.
///
/// Registration order: `name` (substring search), `email` (exact), `role`
/// (exact), `age` (range), `sort`, `limit`. Stages apply last-registered
/// first, so `limit` caps the rows before `sort` orders them.
pub fn users_pipeline() -> pipeline::Result<FilterPipeline> {
    FilterPipeline::new()
        .add_stage(Search::new("name"))?
        .add_stage(ExactMatch::new("email"))?
        .add_stage(ExactMatch::new("role"))?
        .add_stage(NumericRange::new("age"))?
        .add_stage(Sort::new("sort", SORTABLE_FIELDS))?
        .add_stage(Limit::new("limit", MAX_LIMIT))
}
