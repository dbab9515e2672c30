//! Restricted planning for queries embedded as a boolean condition.

use crate::{error::PlanError, plan::PlanOptions, query::Query};

/// In `only_where` mode, reject any clause other than `where`.
pub(crate) fn check(query: Query, options: PlanOptions) -> Result<Query, PlanError> {
    if options.only_where && !is_filter_only(&query) {
        return Err(PlanError::OnlyWhere);
    }

    Ok(query)
}

fn is_filter_only(query: &Query) -> bool {
    query.joins.is_empty()
        && query.select.is_none()
        && query.order_bys.is_empty()
        && query.limit.is_none()
        && query.offset.is_none()
        && query.group_bys.is_empty()
        && query.havings.is_empty()
        && query.preloads.is_empty()
        && query.assocs.is_empty()
        && query.distincts.is_empty()
        && query.lock.is_none()
}
