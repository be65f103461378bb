use super::geometry::Vec2;
use super::input::{ActionStates, InputAction, TextInput};
use super::rendering::{Canvas, SpriteCache};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    Overworld,
    PetCare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(SceneKey),
}

#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    switch_scene_pressed: bool,
    actions: ActionStates,
    cursor_position_px: Option<Vec2>,
    left_click_pressed: bool,
    text: TextInput,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        quit_requested: bool,
        switch_scene_pressed: bool,
        actions: ActionStates,
        cursor_position_px: Option<Vec2>,
        left_click_pressed: bool,
        text: TextInput,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            switch_scene_pressed,
            actions,
            cursor_position_px,
            left_click_pressed,
            text,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn switch_scene_pressed(&self) -> bool {
        self.switch_scene_pressed
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// Held movement keys as a raw axis vector (not normalized).
    pub fn movement_axis(&self) -> Vec2 {
        self.actions.movement_axis()
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn left_click_pressed(&self) -> bool {
        self.left_click_pressed
    }

    pub fn text(&self) -> &TextInput {
        &self.text
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_switch_scene_pressed(mut self, pressed: bool) -> Self {
        self.switch_scene_pressed = pressed;
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_left_click_pressed(mut self, left_click_pressed: bool) -> Self {
        self.left_click_pressed = left_click_pressed;
        self
    }

    pub fn with_typed_text(mut self, text: &str) -> Self {
        self.text.push_text(text);
        self
    }

    pub fn with_enter_pressed(mut self, pressed: bool) -> Self {
        self.text.enter_pressed = pressed;
        self
    }

    pub fn with_backspace_pressed(mut self, pressed: bool) -> Self {
        self.text.backspace_pressed = pressed;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }
}

/// A self-contained screen hosted by the loop runner.
///
/// Scenes own all of their state. The runner calls `load` once before the
/// first `update`, `deactivate` whenever another scene takes over, and
/// `unload` at shutdown.
pub trait Scene {
    fn load(&mut self, sprites: &mut SpriteCache);
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand;
    fn render(&mut self, canvas: &mut Canvas<'_>, sprites: &mut SpriteCache);
    fn unload(&mut self);
    fn deactivate(&mut self) {}
    fn debug_title(&self) -> Option<String> {
        None
    }
}

struct SceneRuntime {
    scene: Box<dyn Scene>,
    is_loaded: bool,
}

pub(crate) struct SceneMachine {
    overworld: SceneRuntime,
    pet_care: SceneRuntime,
    active_scene: SceneKey,
}

impl SceneMachine {
    pub(crate) fn new(
        overworld: Box<dyn Scene>,
        pet_care: Box<dyn Scene>,
        active_scene: SceneKey,
    ) -> Self {
        Self {
            overworld: SceneRuntime {
                scene: overworld,
                is_loaded: false,
            },
            pet_care: SceneRuntime {
                scene: pet_care,
                is_loaded: false,
            },
            active_scene,
        }
    }

    pub(crate) fn active_scene(&self) -> SceneKey {
        self.active_scene
    }

    pub(crate) fn load_active(&mut self, sprites: &mut SpriteCache) {
        self.load_scene_if_needed(self.active_scene, sprites);
    }

    pub(crate) fn update_active(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
    ) -> SceneCommand {
        self.active_runtime_mut()
            .scene
            .update(fixed_dt_seconds, input)
    }

    pub(crate) fn render_active(&mut self, canvas: &mut Canvas<'_>, sprites: &mut SpriteCache) {
        self.active_runtime_mut().scene.render(canvas, sprites);
    }

    pub(crate) fn debug_title_active(&self) -> Option<String> {
        self.runtime_ref(self.active_scene).scene.debug_title()
    }

    pub(crate) fn switch_to(&mut self, next_scene: SceneKey, sprites: &mut SpriteCache) -> bool {
        if self.active_scene == next_scene {
            return false;
        }

        self.active_runtime_mut().scene.deactivate();
        self.load_scene_if_needed(next_scene, sprites);
        self.active_scene = next_scene;
        true
    }

    pub(crate) fn shutdown_all(&mut self) {
        for runtime in [&mut self.overworld, &mut self.pet_care] {
            if runtime.is_loaded {
                runtime.scene.unload();
                runtime.is_loaded = false;
            }
        }
    }

    fn load_scene_if_needed(&mut self, key: SceneKey, sprites: &mut SpriteCache) {
        let runtime = self.runtime_mut(key);
        if runtime.is_loaded {
            return;
        }
        runtime.scene.load(sprites);
        runtime.is_loaded = true;
    }

    fn active_runtime_mut(&mut self) -> &mut SceneRuntime {
        self.runtime_mut(self.active_scene)
    }

    fn runtime_mut(&mut self, key: SceneKey) -> &mut SceneRuntime {
        match key {
            SceneKey::Overworld => &mut self.overworld,
            SceneKey::PetCare => &mut self.pet_care,
        }
    }

    fn runtime_ref(&self, key: SceneKey) -> &SceneRuntime {
        match key {
            SceneKey::Overworld => &self.overworld,
            SceneKey::PetCare => &self.pet_care,
        }
    }
}
