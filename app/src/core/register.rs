use std::sync::Arc;

use tokio::sync::RwLock;

/// Latest-value register shared between handlers. Holds no history, a `set` replaces the value.
pub struct SharedValue<T> {
    value: Arc<RwLock<Option<T>>>,
}

impl<T> Clone for SharedValue<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl<T: Clone> SharedValue<T> {
    pub fn empty() -> Self {
        Self {
            value: Arc::new(RwLock::new(None)),
        }
    }

    pub fn new(initial: T) -> Self {
        Self {
            value: Arc::new(RwLock::new(Some(initial))),
        }
    }

    pub async fn set(&self, value: T) {
        *self.value.write().await = Some(value);
    }

    /// `None` until a value was set for the first time.
    pub async fn get(&self) -> Option<T> {
        self.value.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_register_has_no_value() {
        let register = SharedValue::<f32>::empty();

        assert_eq!(register.get().await, None);
    }

    #[tokio::test]
    async fn set_replaces_value() {
        let register = SharedValue::new(35.0);

        register.set(40.0).await;

        assert_eq!(register.get().await, Some(40.0));
    }

    #[tokio::test]
    async fn clones_see_updates() {
        let register = SharedValue::empty();
        let other = register.clone();

        register.set("on").await;

        assert_eq!(other.get().await, Some("on"));
    }
}
