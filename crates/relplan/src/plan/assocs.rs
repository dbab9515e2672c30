//! Association validation: every projected association must be reachable
//! from its parent model and ride on a join that keeps parent rows.

use crate::{
    error::{PlanError, SourceAction},
    model::Reflection,
    query::{AssocTree, Clause, Query, Source},
};

pub(crate) fn validate(reflection: &dyn Reflection, query: Query) -> Result<Query, PlanError> {
    validate_tree(reflection, &query, &query.assocs, 0)?;

    Ok(query)
}

fn validate_tree(
    reflection: &dyn Reflection,
    query: &Query,
    tree: &AssocTree,
    parent: usize,
) -> Result<(), PlanError> {
    for node in tree {
        let parent_source = source(query, parent)?;
        let Some(parent_model) = &parent_source.model else {
            return Err(PlanError::SourceWithoutModel {
                action: SourceAction::Preload,
                binding: parent,
                table: parent_source.table.clone(),
            });
        };

        let assoc = reflection
            .association(parent_model, &node.name)
            .ok_or_else(|| PlanError::NotAnAssociation {
                model: parent_model.clone(),
                name: node.name.clone(),
            })?;

        let child_model = source(query, node.binding)?.model.as_ref();
        if child_model != Some(&assoc.related) {
            return Err(PlanError::AssociationModelMismatch {
                model: parent_model.clone(),
                name: node.name.clone(),
                expected: assoc.related.clone(),
                found: child_model.cloned(),
            });
        }

        // Binding 0 comes from the from clause, which has no qualifier.
        if let Some(join) = node.binding.checked_sub(1).and_then(|ix| query.joins.get(ix))
            && !join.qualifier.supports_preload()
        {
            return Err(PlanError::InvalidPreloadJoin {
                model: parent_model.clone(),
                name: node.name.clone(),
                qualifier: join.qualifier,
            });
        }

        validate_tree(reflection, query, &node.children, node.binding)?;
    }

    Ok(())
}

fn source(query: &Query, binding: usize) -> Result<&Source, PlanError> {
    query
        .sources
        .get(binding)
        .ok_or(PlanError::BindingOutOfRange {
            clause: Clause::Select,
            binding,
            sources: query.sources.len(),
        })
}
