use std::{
    rc::Rc,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

/// A single-threaded, reference-counted resource with interior mutability.
///
/// `StResource` shares one value between several owners on the same thread,
/// for example the dirty-chunk queue that the world's chunk notifications
/// write into and the renderer drains.
///
/// # Type Parameters
/// - `T`: The type of the contained resource
///
/// # Examples
///
/// ```
/// use voxel_world::core::StResource;
///
/// let resource = StResource::new(vec![1, 2, 3]);
/// let clone = resource.clone();
///
/// // All clones share the same underlying data
/// clone.get_mut().push(4);
/// assert_eq!(resource.get().len(), 4);
/// ```
///
/// # Panics
/// Taking a write guard while any other guard on the same resource is alive
/// deadlocks or panics. Keep guards short-lived.
pub struct StResource<T> {
    resource: Rc<RwLock<T>>,
}

impl<T> StResource<T> {
    /// Creates a new `StResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Rc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read-only guard to the contained value.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a mutable guard to the contained value.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether `self` and `other` share the same value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.resource, &other.resource)
    }
}

impl<T> Clone for StResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

impl<T: Default> Default for StResource<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
