//! Attribute update strategies for split and collapse.
//!
//! After an edit the executor reports, for every created simplex, where its
//! data should come from (see [`Provenance`]) and, for a collapse, which
//! simplices were merged. A strategy turns that report into attribute values;
//! the executor never looks at user data itself.
//!
//! Defaults, used for every user attribute without an explicit entry:
//!
//! | event | float attributes | integer attributes |
//! |-------|------------------|--------------------|
//! | split, rib | mean of both sides | tuple side |
//! | split, spine | copy | copy |
//! | collapse | keep survivor | keep survivor |

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::attribute::{
    AttributeHandle, AttributeRole, AttributeValue, MeshAttributeHandle, TypedAttributeHandle,
};
use crate::executor::{EditRecord, Provenance};
use crate::mesh::MeshCore;
use crate::mesh_error::MeshError;
use crate::multimesh::MeshId;
use crate::primitive::PrimitiveType;

/// Combines the tuple-side and other-side values into a new value.
pub type PairFn<T> = Arc<dyn Fn(&[T], &[T]) -> Vec<T> + Send + Sync>;
/// Maps the value of an old simplex to the value of its piece.
pub type SpineFn<T> = Arc<dyn Fn(&[T]) -> Vec<T> + Send + Sync>;
/// Marks simplices whose value must win over the other side.
pub type SimplexPredicate = Arc<dyn Fn(&MeshCore, PrimitiveType, i64) -> bool + Send + Sync>;

/// Value of a simplex created between two old ones (the split vertex, the
/// edge from the split vertex to an opposite vertex, ...).
#[derive(Clone)]
pub enum SplitRibRule<T> {
    None,
    CopyTuple,
    CopyOther,
    Mean,
    Min,
    Max,
    Custom(PairFn<T>),
}

/// Value of a piece of an old simplex (the two halves of the split edge,
/// the two halves of each split cell, ...).
#[derive(Clone)]
pub enum SplitSpineRule<T> {
    None,
    Copy,
    Custom(SpineFn<T>),
}

/// Value of the survivor when a collapse merges two simplices.
#[derive(Clone)]
pub enum CollapseRule<T> {
    None,
    CopyTuple,
    CopyOther,
    Mean,
    Min,
    Max,
    Custom(PairFn<T>),
}

macro_rules! debug_pair_rule {
    ($name:ident) => {
        impl<T> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $name::None => "None",
                    $name::CopyTuple => "CopyTuple",
                    $name::CopyOther => "CopyOther",
                    $name::Mean => "Mean",
                    $name::Min => "Min",
                    $name::Max => "Max",
                    $name::Custom(_) => "Custom",
                })
            }
        }
    };
}

debug_pair_rule!(SplitRibRule);
debug_pair_rule!(CollapseRule);

impl<T> fmt::Debug for SplitSpineRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SplitSpineRule::None => "None",
            SplitSpineRule::Copy => "Copy",
            SplitSpineRule::Custom(_) => "Custom",
        })
    }
}

/// How one attribute follows split and collapse.
#[derive(Clone)]
pub struct AttributeStrategy<T> {
    pub split_rib: SplitRibRule<T>,
    pub split_spine: SplitSpineRule<T>,
    pub collapse: CollapseRule<T>,
    /// When exactly one side satisfies the predicate, its value is copied
    /// regardless of the rule.
    pub predicate: Option<SimplexPredicate>,
}

impl<T: AttributeValue> Default for AttributeStrategy<T> {
    fn default() -> Self {
        Self {
            split_rib: if T::IS_INTEGER {
                SplitRibRule::CopyTuple
            } else {
                SplitRibRule::Mean
            },
            split_spine: SplitSpineRule::Copy,
            collapse: CollapseRule::CopyOther,
            predicate: None,
        }
    }
}

impl<T> fmt::Debug for AttributeStrategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeStrategy")
            .field("split_rib", &self.split_rib)
            .field("split_spine", &self.split_spine)
            .field("collapse", &self.collapse)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

impl<T: AttributeValue> AttributeStrategy<T> {
    /// Leave every new value at the attribute default.
    pub fn none() -> Self {
        Self {
            split_rib: SplitRibRule::None,
            split_spine: SplitSpineRule::None,
            collapse: CollapseRule::None,
            predicate: None,
        }
    }

    pub fn with_split_rib(mut self, rule: SplitRibRule<T>) -> Self {
        self.split_rib = rule;
        self
    }

    pub fn with_split_spine(mut self, rule: SplitSpineRule<T>) -> Self {
        self.split_spine = rule;
        self
    }

    pub fn with_collapse(mut self, rule: CollapseRule<T>) -> Self {
        self.collapse = rule;
        self
    }

    pub fn with_predicate(mut self, predicate: SimplexPredicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Which side wins outright under the predicate, if any.
    fn pinned_side(&self, core: &MeshCore, pt: PrimitiveType, tuple_side: i64, other: i64) -> Option<i64> {
        let predicate = self.predicate.as_ref()?;
        match (predicate(core, pt, tuple_side), predicate(core, pt, other)) {
            (true, false) => Some(tuple_side),
            (false, true) => Some(other),
            _ => None,
        }
    }

    /// Write values for everything `record` created or merged on the
    /// attribute's primitive.
    pub fn apply(
        &self,
        core: &mut MeshCore,
        handle: TypedAttributeHandle<T>,
        record: &EditRecord,
    ) -> Result<(), MeshError> {
        let pt = handle.primitive_type();
        let d = pt.dimension();
        for created in &record.created[d] {
            let value = match created.provenance {
                Provenance::Spine(old) => {
                    let old_value = core.attributes().get(handle).vector(old as usize);
                    match &self.split_spine {
                        SplitSpineRule::None => None,
                        SplitSpineRule::Copy => Some(old_value.to_vec()),
                        SplitSpineRule::Custom(f) => Some(f(old_value)),
                    }
                }
                Provenance::Rib(x, y) => match self.pinned_side(core, pt, x, y) {
                    Some(side) => Some(core.attributes().get(handle).vector(side as usize).to_vec()),
                    None => {
                        let attr = core.attributes().get(handle);
                        let (vx, vy) = (attr.vector(x as usize), attr.vector(y as usize));
                        match &self.split_rib {
                            SplitRibRule::None => None,
                            SplitRibRule::CopyTuple => Some(vx.to_vec()),
                            SplitRibRule::CopyOther => Some(vy.to_vec()),
                            SplitRibRule::Mean => Some(zip_with(vx, vy, T::mean)),
                            SplitRibRule::Min => Some(zip_with(vx, vy, min_of)),
                            SplitRibRule::Max => Some(zip_with(vx, vy, max_of)),
                            SplitRibRule::Custom(f) => Some(f(vx, vy)),
                        }
                    }
                },
            };
            if let Some(value) = value {
                write(core, handle, created.id, &value)?;
            }
        }
        for &(survivor, removed) in &record.merged[d] {
            let value = match self.pinned_side(core, pt, removed, survivor) {
                Some(side) => Some(core.attributes().get(handle).vector(side as usize).to_vec()),
                None => {
                    let attr = core.attributes().get(handle);
                    let (vt, vo) = (attr.vector(removed as usize), attr.vector(survivor as usize));
                    match &self.collapse {
                        CollapseRule::None | CollapseRule::CopyOther => None,
                        CollapseRule::CopyTuple => Some(vt.to_vec()),
                        CollapseRule::Mean => Some(zip_with(vt, vo, T::mean)),
                        CollapseRule::Min => Some(zip_with(vt, vo, min_of)),
                        CollapseRule::Max => Some(zip_with(vt, vo, max_of)),
                        CollapseRule::Custom(f) => Some(f(vt, vo)),
                    }
                }
            };
            if let Some(value) = value {
                write(core, handle, survivor, &value)?;
            }
        }
        Ok(())
    }
}

fn zip_with<T: Copy>(x: &[T], y: &[T], f: impl Fn(T, T) -> T) -> Vec<T> {
    x.iter().zip(y).map(|(&a, &b)| f(a, b)).collect()
}

fn min_of<T: PartialOrd>(a: T, b: T) -> T {
    if b < a { b } else { a }
}

fn max_of<T: PartialOrd>(a: T, b: T) -> T {
    if b > a { b } else { a }
}

fn write<T: AttributeValue>(
    core: &mut MeshCore,
    handle: TypedAttributeHandle<T>,
    id: i64,
    value: &[T],
) -> Result<(), MeshError> {
    let attribute = core.attributes_mut().get_mut(handle);
    if value.len() != attribute.dimension() {
        return Err(MeshError::AttributeDimensionMismatch {
            name: attribute.name().to_string(),
            expected: attribute.dimension(),
            found: value.len(),
        });
    }
    attribute.set_vector(id as usize, value);
    Ok(())
}

/// A strategy for an attribute of any value type.
#[derive(Clone, Debug)]
pub enum AnyAttributeStrategy {
    Char(AttributeStrategy<i8>),
    Long(AttributeStrategy<i64>),
    Double(AttributeStrategy<f64>),
}

/// Value types that strategies can be stored for.
pub trait StrategyValue: AttributeValue {
    fn wrap_strategy(strategy: AttributeStrategy<Self>) -> AnyAttributeStrategy;
    fn strategy_of(any: &AnyAttributeStrategy) -> Option<&AttributeStrategy<Self>>;
}

macro_rules! impl_strategy_value {
    ($t:ty, $variant:ident) => {
        impl StrategyValue for $t {
            fn wrap_strategy(strategy: AttributeStrategy<Self>) -> AnyAttributeStrategy {
                AnyAttributeStrategy::$variant(strategy)
            }

            fn strategy_of(any: &AnyAttributeStrategy) -> Option<&AttributeStrategy<Self>> {
                match any {
                    AnyAttributeStrategy::$variant(s) => Some(s),
                    _ => None,
                }
            }
        }
    };
}

impl_strategy_value!(i8, Char);
impl_strategy_value!(i64, Long);
impl_strategy_value!(f64, Double);

/// Strategies of the attributes an operation touches, across a multi-mesh
/// tree.
#[derive(Clone, Debug, Default)]
pub struct StrategyTable {
    entries: HashMap<MeshAttributeHandle, AnyAttributeStrategy>,
}

impl StrategyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: StrategyValue>(
        &mut self,
        mesh: MeshId,
        handle: TypedAttributeHandle<T>,
        strategy: AttributeStrategy<T>,
    ) -> &mut Self {
        self.entries.insert(
            MeshAttributeHandle::new(mesh, T::wrap(handle)),
            T::wrap_strategy(strategy),
        );
        self
    }

    pub fn get<T: StrategyValue>(
        &self,
        mesh: &MeshId,
        handle: TypedAttributeHandle<T>,
    ) -> Option<&AttributeStrategy<T>> {
        self.entries
            .get(&MeshAttributeHandle::new(mesh.clone(), T::wrap(handle)))
            .and_then(T::strategy_of)
    }

    fn apply_typed<T: StrategyValue>(
        &self,
        mesh: &MeshId,
        core: &mut MeshCore,
        record: &EditRecord,
    ) -> Result<(), MeshError> {
        for pt in core.top_simplex_type().up_to() {
            for handle in core.attributes().handles::<T>(pt) {
                if core.attributes().get(handle).role() != AttributeRole::User {
                    continue;
                }
                match self.get(mesh, handle) {
                    Some(strategy) => strategy.apply(core, handle, record)?,
                    None => AttributeStrategy::<T>::default().apply(core, handle, record)?,
                }
            }
        }
        Ok(())
    }

    /// Update every user attribute of the mesh at `mesh` after `record`.
    pub fn apply(&self, mesh: &MeshId, core: &mut MeshCore, record: &EditRecord) -> Result<(), MeshError> {
        self.apply_typed::<i8>(mesh, core, record)?;
        self.apply_typed::<i64>(mesh, core, record)?;
        self.apply_typed::<f64>(mesh, core, record)
    }

    /// Handles with an explicit strategy.
    pub fn handles(&self) -> impl Iterator<Item = &MeshAttributeHandle> + '_ {
        self.entries.keys()
    }

    pub fn contains(&self, mesh: &MeshId, handle: AttributeHandle) -> bool {
        self.entries
            .contains_key(&MeshAttributeHandle::new(mesh.clone(), handle))
    }
}
