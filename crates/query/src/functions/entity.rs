//! Functions over graph entities.

use super::{expect_arity, mismatch, strings};
use crate::context::RuntimeContext;
use alloc::string::ToString;
use alloc::vec::Vec;
use strata_core::{Entry, FieldData, Result};

pub(super) fn id(ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("id", args, 1)?;
    let arg = &args[0];
    if arg.is_null() {
        return Ok(FieldData::null());
    }
    if !arg.is_node() && !arg.is_relationship() {
        return Err(mismatch("id", "Node or Relationship", arg));
    }
    if !ctx.graph().is_valid(arg) {
        return Ok(FieldData::null());
    }
    Ok(match (arg.node_id(), arg.edge_id()) {
        (Some(n), _) => FieldData::from(n),
        (_, Some(e)) => FieldData::from(e.id),
        _ => FieldData::null(),
    })
}

pub(super) fn rel_type(ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("type", args, 1)?;
    let arg = &args[0];
    if arg.is_null() {
        return Ok(FieldData::null());
    }
    if !arg.is_relationship() {
        return Err(mismatch("type", "Relationship", arg));
    }
    if !ctx.graph().is_valid(arg) {
        return Ok(FieldData::null());
    }
    ctx.graph().relationship_type(arg).map(FieldData::from)
}

/// `label(x)`: the first label of a node, or the type of a relationship.
pub(super) fn label(ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("label", args, 1)?;
    let arg = &args[0];
    if arg.is_null() {
        return Ok(FieldData::null());
    }
    if !arg.is_node() && !arg.is_relationship() {
        return Err(mismatch("label", "Node or Relationship", arg));
    }
    if !ctx.graph().is_valid(arg) {
        return Ok(FieldData::null());
    }
    if arg.is_relationship() {
        return ctx.graph().relationship_type(arg).map(FieldData::from);
    }
    let labels = ctx.graph().labels(arg)?;
    Ok(labels.into_iter().next().map_or_else(FieldData::null, FieldData::from))
}

/// `euid(r)`: the full edge identity as `src_dst_id`.
pub(super) fn euid(ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("euid", args, 1)?;
    let arg = &args[0];
    if arg.is_null() {
        return Ok(FieldData::null());
    }
    let Some(edge) = arg.edge_id() else {
        return Err(mismatch("euid", "Relationship", arg));
    };
    if !ctx.graph().is_valid(arg) {
        return Ok(FieldData::null());
    }
    Ok(FieldData::from(edge.to_string()))
}

pub(super) fn labels(ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("labels", args, 1)?;
    let arg = &args[0];
    if arg.is_null() {
        return Ok(FieldData::null());
    }
    if !arg.is_node() {
        return Err(mismatch("labels", "Node", arg));
    }
    ctx.graph().labels(arg).map(strings)
}

pub(super) fn properties(ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("properties", args, 1)?;
    let arg = &args[0];
    match arg {
        Entry::Constant(c) if c.is_null() || c.is_map() => Ok(c.clone()),
        _ if arg.is_node() || arg.is_relationship() => {
            ctx.graph().properties(arg).map(FieldData::Map)
        }
        _ => Err(mismatch("properties", "Node, Relationship or Map", arg)),
    }
}

pub(super) fn keys(ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("keys", args, 1)?;
    let arg = &args[0];
    match arg {
        Entry::Constant(c) if c.is_null() => Ok(FieldData::null()),
        Entry::Constant(FieldData::Map(m)) => Ok(strings(m.keys().cloned())),
        _ if arg.is_node() || arg.is_relationship() => {
            let props = ctx.graph().properties(arg)?;
            Ok(strings(props.into_keys()))
        }
        _ => Err(mismatch("keys", "Node, Relationship or Map", arg)),
    }
}

pub(super) fn start_node(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("startnode", args, 1)?;
    match args[0].edge_id() {
        Some(e) => Ok(FieldData::from(e.src)),
        None if args[0].is_null() => Ok(FieldData::null()),
        None => Err(mismatch("startnode", "Relationship", &args[0])),
    }
}

pub(super) fn end_node(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("endnode", args, 1)?;
    match args[0].edge_id() {
        Some(e) => Ok(FieldData::from(e.dst)),
        None if args[0].is_null() => Ok(FieldData::null()),
        None => Err(mismatch("endnode", "Relationship", &args[0])),
    }
}

/// Builds a path value from its elements in order. Variable-length relationships
/// contribute each of their edges.
pub(super) fn to_path(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            Entry::VarLenRelationship(edges) => {
                out.extend(edges.iter().map(|e| Entry::Relationship(*e).to_string()));
            }
            _ if arg.is_entity() => out.push(arg.to_string()),
            _ if arg.is_null() => return Ok(FieldData::null()),
            _ => return Err(mismatch(super::TO_PATH, "graph entity", arg)),
        }
    }
    Ok(strings(out))
}
