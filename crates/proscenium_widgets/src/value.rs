//! Lazily-resolved size values.
//!
//! A [`Value`] defers a float to layout time: a fixed constant, or a size
//! query against a context actor resolved through the stage when the owning
//! widget lays out.

use proscenium_scene::{ActorId, SceneResult, Stage};

/// A float resolved at layout time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// A fixed constant.
    Fixed(f32),
    /// The preferred width of an actor.
    PrefWidth(ActorId),
    /// The preferred height of an actor.
    PrefHeight(ActorId),
    /// The minimum width of an actor.
    MinWidth(ActorId),
    /// The minimum height of an actor.
    MinHeight(ActorId),
    /// A fraction of an actor's current width.
    PercentWidth(f32, ActorId),
    /// A fraction of an actor's current height.
    PercentHeight(f32, ActorId),
}

impl Value {
    /// Zero, the default padding value.
    pub const ZERO: Self = Self::Fixed(0.0);

    /// Resolves the value against the stage.
    pub fn get(&self, stage: &mut Stage) -> SceneResult<f32> {
        match *self {
            Self::Fixed(v) => Ok(v),
            Self::PrefWidth(id) => Ok(stage.pref_size(id)?.x),
            Self::PrefHeight(id) => Ok(stage.pref_size(id)?.y),
            Self::MinWidth(id) => Ok(stage.min_size(id)?.x),
            Self::MinHeight(id) => Ok(stage.min_size(id)?.y),
            Self::PercentWidth(fraction, id) => Ok(stage.actor(id)?.width() * fraction),
            Self::PercentHeight(fraction, id) => Ok(stage.actor(id)?.height() * fraction),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Fixed(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_and_percent() {
        let mut stage = Stage::new(100.0, 100.0);
        let actor = stage.new_actor();
        stage.actor_mut(actor).unwrap().set_size(80.0, 40.0);

        assert_eq!(Value::Fixed(5.0).get(&mut stage).unwrap(), 5.0);
        assert_eq!(Value::PercentWidth(0.5, actor).get(&mut stage).unwrap(), 40.0);
        assert_eq!(Value::PercentHeight(0.25, actor).get(&mut stage).unwrap(), 10.0);
        // Plain actors report their size as preferred size.
        assert_eq!(Value::PrefWidth(actor).get(&mut stage).unwrap(), 80.0);
        assert_eq!(Value::MinHeight(actor).get(&mut stage).unwrap(), 40.0);
    }
}
