/// Structural equality used to compare snapshots.
///
/// The history never looks inside a snapshot. It only asks whether two of
/// them represent the same state, through the `SnapshotEq` seam.
use serde::Serialize;

/// Decides whether two snapshots represent the same state.
///
/// Implementations must be deep, order-sensitive and field-complete.
pub trait SnapshotEq<T: ?Sized> {
    fn snapshots_eq(&self, a: &T, b: &T) -> bool;
}

/// Compares snapshots with `PartialEq`.
///
/// Derived `PartialEq` on structs, `Vec` and `BTreeMap` is already a deep,
/// order-sensitive comparison, so this is the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialEqSnapshots;

impl<T: PartialEq + ?Sized> SnapshotEq<T> for PartialEqSnapshots {
    fn snapshots_eq(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

/// Compares snapshots by their JSON value representation.
///
/// `serde_json::Value` keeps object keys sorted, so two values serialize to
/// the same tree regardless of map iteration order. A snapshot that fails to
/// serialize is never equal to anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSnapshots;

impl<T: Serialize + ?Sized> SnapshotEq<T> for JsonSnapshots {
    fn snapshots_eq(&self, a: &T, b: &T) -> bool {
        match (serde_json::to_value(a), serde_json::to_value(b)) {
            (Ok(a), Ok(b)) => a == b,
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("Failed to serialize snapshot for comparison: {e}");
                false
            }
        }
    }
}

impl<T: ?Sized, F> SnapshotEq<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn snapshots_eq(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}
