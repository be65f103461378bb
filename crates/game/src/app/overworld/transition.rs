use engine::Rect;

/// Destination of a map transition: a map name and a spawn id inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MapTarget {
    pub(crate) map: String,
    pub(crate) spawn: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TransitionTrigger {
    pub(crate) rect: Rect,
    pub(crate) target: MapTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TintPhase {
    Idle,
    TintingOut,
    TintingIn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TintEvent {
    None,
    /// Screen is fully dark; the target map should be built now.
    SwapMap(MapTarget),
    /// Screen is clear again; the player may move.
    Cleared,
}

/// Full-screen fade used while switching maps.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScreenTint {
    phase: TintPhase,
    alpha: f32,
    speed: f32,
    pending: Option<MapTarget>,
}

impl ScreenTint {
    pub(crate) fn new(speed: f32) -> Self {
        Self {
            phase: TintPhase::Idle,
            alpha: 0.0,
            speed,
            pending: None,
        }
    }

    pub(crate) fn phase(&self) -> TintPhase {
        self.phase
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.phase == TintPhase::Idle
    }

    pub(crate) fn alpha(&self) -> u8 {
        self.alpha.round().clamp(0.0, 255.0) as u8
    }

    /// Starts fading out towards `target`. Ignored unless idle.
    pub(crate) fn begin(&mut self, target: MapTarget) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.pending = Some(target);
        self.phase = TintPhase::TintingOut;
        true
    }

    pub(crate) fn step(&mut self, dt: f32) -> TintEvent {
        match self.phase {
            TintPhase::Idle => {
                self.alpha = 0.0;
                TintEvent::None
            }
            TintPhase::TintingOut => {
                self.alpha = (self.alpha + self.speed * dt).clamp(0.0, 255.0);
                if self.alpha < 255.0 {
                    return TintEvent::None;
                }
                self.phase = TintPhase::TintingIn;
                match self.pending.take() {
                    Some(target) => TintEvent::SwapMap(target),
                    None => TintEvent::None,
                }
            }
            TintPhase::TintingIn => {
                self.alpha = (self.alpha - self.speed * dt).clamp(0.0, 255.0);
                if self.alpha > 0.0 {
                    return TintEvent::None;
                }
                self.phase = TintPhase::Idle;
                TintEvent::Cleared
            }
        }
    }
}

/// First trigger whose rectangle overlaps `hitbox`.
pub(crate) fn find_trigger<'a>(
    triggers: &'a [TransitionTrigger],
    hitbox: &Rect,
) -> Option<&'a TransitionTrigger> {
    triggers.iter().find(|trigger| trigger.rect.overlaps(hitbox))
}
