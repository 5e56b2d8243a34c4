//! Relationship helpers: nested rendering and child re-parenting.
//!
//! Related records are always serialized in their detached form, so a child
//! rendered under its owner never expands the owner again (and vice versa).
//! Nested records carry only their key and scalar fields.

use crate::model::Entity;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Key and scalar fields of `e`. Relation keys are left out, so nesting
/// stops after one level.
fn nested<E: Entity>(e: &E) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(e.detached())?;
    if let Value::Object(map) = &mut value {
        let def = E::table();
        for field in def.references.iter().map(|r| r.field).chain(def.collections.iter().map(|c| c.field)) {
            map.remove(field);
        }
    }
    Ok(value)
}

fn serialize_nested<E: Entity, S: Serializer>(e: &E, serializer: S) -> Result<S::Ok, S::Error> {
    nested(e).map_err(S::Error::custom)?.serialize(serializer)
}

/// `serialize_with` for a many-to-one reference.
pub fn detached_one<E, S>(value: &Option<E>, serializer: S) -> Result<S::Ok, S::Error>
where
    E: Entity,
    S: Serializer,
{
    match value {
        Some(e) => serialize_nested(e, serializer),
        None => serializer.serialize_none(),
    }
}

/// `serialize_with` for a boxed many-to-one reference (self references).
pub fn detached_boxed<E, S>(value: &Option<Box<E>>, serializer: S) -> Result<S::Ok, S::Error>
where
    E: Entity,
    S: Serializer,
{
    match value {
        Some(e) => serialize_nested(e.as_ref(), serializer),
        None => serializer.serialize_none(),
    }
}

/// `serialize_with` for a one-to-many collection.
#[allow(clippy::ptr_arg)]
pub fn detached_many<E, S>(values: &Vec<E>, serializer: S) -> Result<S::Ok, S::Error>
where
    E: Entity,
    S: Serializer,
{
    let items = values.iter().map(nested).collect::<Result<Vec<_>, _>>().map_err(S::Error::custom)?;
    items.serialize(serializer)
}

/// Replaces an owner's children with `next`.
///
/// Children that are not part of `next` get their back-reference cleared and
/// are returned; every child of `next` gets its back-reference set to `owner`.
pub fn replace_children<C, O, F>(children: &mut Vec<C>, next: Vec<C>, owner: &O, back_ref: F) -> Vec<C>
where
    C: Entity,
    O: Clone,
    F: Fn(&mut C) -> &mut Option<O>,
{
    let mut released = Vec::new();
    for mut child in children.drain(..) {
        if !next.contains(&child) {
            *back_ref(&mut child) = None;
            released.push(child);
        }
    }
    *children = next
        .into_iter()
        .map(|mut child| {
            *back_ref(&mut child) = Some(owner.clone());
            child
        })
        .collect();
    released
}

/// Adds one child, pointing it at `owner`. A child already present (same key) is replaced.
pub fn add_child<C, O, F>(children: &mut Vec<C>, mut child: C, owner: &O, back_ref: F)
where
    C: Entity,
    O: Clone,
    F: Fn(&mut C) -> &mut Option<O>,
{
    *back_ref(&mut child) = Some(owner.clone());
    children.retain(|c| c != &child);
    children.push(child);
}

/// Removes one child and clears its back-reference. Returns the removed child, if held.
pub fn remove_child<C, O, F>(children: &mut Vec<C>, child: &C, back_ref: F) -> Option<C>
where
    C: Entity,
    F: Fn(&mut C) -> &mut Option<O>,
{
    let pos = children.iter().position(|c| c == child)?;
    let mut removed = children.remove(pos);
    *back_ref(&mut removed) = None;
    Some(removed)
}
