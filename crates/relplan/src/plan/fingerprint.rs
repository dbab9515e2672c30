//! Structural cache key for prepared queries.
//!
//! Parameter values never enter the digest, so queries that differ only in
//! their parameters share a key. Source locations are diagnostics and are
//! skipped as well.
#![allow(clippy::cast_possible_truncation)]

use crate::{
    model::{FieldType, ModelId},
    query::{AssocTree, Expr, JoinExpr, JoinQualifier, JoinSource, Operator, Query, SourceRef},
    value::Value,
};
use sha2::{Digest, Sha256};
use std::fmt;

///
/// CacheKey
///
/// SHA-256 digest of a prepared query's structure.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    /// Compute the key of a prepared query.
    #[must_use]
    pub fn of(query: &Query) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"relplan:cache:v1");
        hash_query(&mut hasher, query);

        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Self(out)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn as_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            use std::fmt::Write as _;
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

fn hash_query(hasher: &mut Sha256, query: &Query) {
    write_tag(hasher, 0x01);
    match &query.from {
        Some(source) => hash_source_ref(hasher, source),
        None => write_tag(hasher, 0x00),
    }

    write_tag(hasher, 0x02);
    write_u32(hasher, query.joins.len() as u32);
    for join in &query.joins {
        hash_join(hasher, join);
    }

    write_tag(hasher, 0x03);
    write_u32(hasher, query.sources.len() as u32);
    for source in &query.sources {
        write_str(hasher, &source.table);
        write_model(hasher, source.model.as_ref());
    }

    write_tag(hasher, 0x04);
    match &query.select {
        Some(select) => {
            write_tag(hasher, 0x01);
            hash_expr(hasher, &select.expr.expr);
        }
        None => write_tag(hasher, 0x00),
    }

    let clauses = [
        (0x05, &query.distincts),
        (0x06, &query.wheres),
        (0x07, &query.group_bys),
        (0x08, &query.havings),
        (0x09, &query.order_bys),
    ];
    for (tag, exprs) in clauses {
        write_tag(hasher, tag);
        write_u32(hasher, exprs.len() as u32);
        for expr in exprs {
            hash_expr(hasher, &expr.expr);
        }
    }

    for (tag, expr) in [(0x0a, &query.limit), (0x0b, &query.offset)] {
        write_tag(hasher, tag);
        match expr {
            Some(expr) => {
                write_tag(hasher, 0x01);
                hash_expr(hasher, &expr.expr);
            }
            None => write_tag(hasher, 0x00),
        }
    }

    write_tag(hasher, 0x0c);
    write_u32(hasher, query.preloads.len() as u32);
    for preload in &query.preloads {
        write_str(hasher, preload);
    }

    write_tag(hasher, 0x0d);
    hash_assocs(hasher, &query.assocs);

    write_tag(hasher, 0x0e);
    match &query.lock {
        Some(lock) => {
            write_tag(hasher, 0x01);
            write_str(hasher, &lock.0);
        }
        None => write_tag(hasher, 0x00),
    }
}

fn hash_join(hasher: &mut Sha256, join: &JoinExpr) {
    write_tag(hasher, qualifier_tag(join.qualifier));
    match &join.source {
        JoinSource::Explicit(source) => {
            write_tag(hasher, 0x20);
            hash_source_ref(hasher, source);
        }
        JoinSource::Assoc { binding, name } => {
            write_tag(hasher, 0x21);
            write_u32(hasher, *binding as u32);
            write_str(hasher, name);
        }
    }
    hash_expr(hasher, &join.on.expr);
}

fn hash_source_ref(hasher: &mut Sha256, source: &SourceRef) {
    match source {
        SourceRef::Table(table) => {
            write_tag(hasher, 0x30);
            write_str(hasher, table);
        }
        SourceRef::Model(model) => {
            write_tag(hasher, 0x31);
            write_str(hasher, model.as_str());
        }
        SourceRef::TableModel { table, model } => {
            write_tag(hasher, 0x32);
            write_str(hasher, table);
            write_str(hasher, model.as_str());
        }
    }
}

fn hash_assocs(hasher: &mut Sha256, tree: &AssocTree) {
    write_u32(hasher, tree.len() as u32);
    for node in tree {
        write_str(hasher, &node.name);
        write_u32(hasher, node.binding as u32);
        hash_assocs(hasher, &node.children);
    }
}

fn hash_expr(hasher: &mut Sha256, expr: &Expr) {
    match expr {
        Expr::Binding(binding) => {
            write_tag(hasher, 0x40);
            write_u32(hasher, *binding as u32);
        }
        Expr::Field(access) => {
            write_tag(hasher, 0x41);
            write_u32(hasher, access.binding as u32);
            write_str(hasher, &access.name);
            match &access.expected {
                Some(ty) => {
                    write_tag(hasher, 0x01);
                    hash_field_type(hasher, ty);
                }
                None => write_tag(hasher, 0x00),
            }
        }
        Expr::Param(key) => {
            write_tag(hasher, 0x42);
            write_u32(hasher, *key as u32);
        }
        Expr::Literal(value) => {
            write_tag(hasher, 0x43);
            hash_value(hasher, value);
        }
        Expr::Apply { op, args } => {
            write_tag(hasher, 0x44);
            write_tag(hasher, op.tag());
            if let Operator::Call(name) = op {
                write_str(hasher, name);
            }
            hash_exprs(hasher, args);
        }
        Expr::Tuple(items) => {
            write_tag(hasher, 0x45);
            hash_exprs(hasher, items);
        }
        Expr::List(items) => {
            write_tag(hasher, 0x46);
            hash_exprs(hasher, items);
        }
    }
}

fn hash_exprs(hasher: &mut Sha256, exprs: &[Expr]) {
    write_u32(hasher, exprs.len() as u32);
    for expr in exprs {
        hash_expr(hasher, expr);
    }
}

fn hash_field_type(hasher: &mut Sha256, ty: &FieldType) {
    let tag = match ty {
        FieldType::Any => 0x50,
        FieldType::Array(inner) => {
            write_tag(hasher, 0x51);
            hash_field_type(hasher, inner);
            return;
        }
        FieldType::Binary => 0x52,
        FieldType::Boolean => 0x53,
        FieldType::Date => 0x54,
        FieldType::Decimal => 0x55,
        FieldType::Float => 0x56,
        FieldType::Id => 0x57,
        FieldType::Integer => 0x58,
        FieldType::String => 0x59,
        FieldType::Timestamp => 0x5a,
    };
    write_tag(hasher, tag);
}

fn hash_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Null => write_tag(hasher, 0x60),
        Value::Bool(v) => {
            write_tag(hasher, 0x61);
            write_tag(hasher, u8::from(*v));
        }
        Value::Int(v) => {
            write_tag(hasher, 0x62);
            hasher.update(v.to_be_bytes());
        }
        Value::Float(v) => {
            write_tag(hasher, 0x63);
            hasher.update(v.to_bits().to_be_bytes());
        }
        Value::Decimal(v) => {
            write_tag(hasher, 0x64);
            hasher.update(v.normalize().serialize());
        }
        Value::Text(v) => {
            write_tag(hasher, 0x65);
            write_str(hasher, v);
        }
        Value::Blob(v) => {
            write_tag(hasher, 0x66);
            write_u32(hasher, v.len() as u32);
            hasher.update(v);
        }
        Value::Date(v) => {
            write_tag(hasher, 0x67);
            hasher.update(v.to_julian_day().to_be_bytes());
        }
        Value::Timestamp(v) => {
            write_tag(hasher, 0x68);
            hasher.update(v.unix_timestamp_nanos().to_be_bytes());
        }
        Value::List(items) => {
            write_tag(hasher, 0x69);
            write_u32(hasher, items.len() as u32);
            for item in items {
                hash_value(hasher, item);
            }
        }
    }
}

const fn qualifier_tag(qualifier: JoinQualifier) -> u8 {
    match qualifier {
        JoinQualifier::Inner => 0x10,
        JoinQualifier::Left => 0x11,
        JoinQualifier::Right => 0x12,
        JoinQualifier::Full => 0x13,
        JoinQualifier::Cross => 0x14,
    }
}

fn write_model(hasher: &mut Sha256, model: Option<&ModelId>) {
    match model {
        Some(model) => {
            write_tag(hasher, 0x01);
            write_str(hasher, model.as_str());
        }
        None => write_tag(hasher, 0x00),
    }
}

fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}

fn write_u32(hasher: &mut Sha256, value: u32) {
    hasher.update(value.to_be_bytes());
}

fn write_str(hasher: &mut Sha256, value: &str) {
    write_u32(hasher, value.len() as u32);
    hasher.update(value.as_bytes());
}
