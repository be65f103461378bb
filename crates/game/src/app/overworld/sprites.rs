use engine::{Canvas, FrameRef, Rect, SpriteCache, Vec2};

use super::entity::EntityBody;

/// Draw layers, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum WorldLayer {
    Water,
    Bg,
    Shadow,
    Main,
    Top,
}

impl WorldLayer {
    pub(crate) const ALL: [WorldLayer; 5] = [
        WorldLayer::Water,
        WorldLayer::Bg,
        WorldLayer::Shadow,
        WorldLayer::Main,
        WorldLayer::Top,
    ];
}

const MONSTER_PATCH_SORT_OFFSET: f32 = -40.0;
const SAND_BIOME: &str = "sand";

/// Anything owned by the map registry.
pub(crate) trait WorldSprite {
    fn layer(&self) -> WorldLayer;

    /// Sort key inside the main layer.
    fn y_sort(&self) -> f32;

    fn update(&mut self, _dt: f32) {}

    fn draw(&mut self, canvas: &mut Canvas<'_>, sprites: &mut SpriteCache, offset: Vec2);

    /// Collision box, for sprites that block the player.
    fn hitbox(&self) -> Option<Rect> {
        None
    }
}

/// Single image at a fixed position.
pub(crate) struct StaticSprite {
    frame: FrameRef,
    rect: Rect,
    layer: WorldLayer,
}

impl StaticSprite {
    pub(crate) fn new(frame: FrameRef, rect: Rect, layer: WorldLayer) -> Self {
        Self { frame, rect, layer }
    }
}

impl WorldSprite for StaticSprite {
    fn layer(&self) -> WorldLayer {
        self.layer
    }

    fn y_sort(&self) -> f32 {
        self.rect.center_y()
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, sprites: &mut SpriteCache, offset: Vec2) {
        draw_at(canvas, sprites, &self.frame, self.rect, offset);
    }
}

/// Looping frame sequence, used for water and coast tiles.
pub(crate) struct AnimatedSprite {
    frames: Vec<FrameRef>,
    rect: Rect,
    layer: WorldLayer,
    frame_index: f32,
    animation_speed: f32,
}

impl AnimatedSprite {
    pub(crate) fn new(
        frames: Vec<FrameRef>,
        rect: Rect,
        layer: WorldLayer,
        animation_speed: f32,
    ) -> Self {
        Self {
            frames,
            rect,
            layer,
            frame_index: 0.0,
            animation_speed,
        }
    }

    fn current_frame(&self) -> Option<&FrameRef> {
        if self.frames.is_empty() {
            return None;
        }
        let index = (self.frame_index.max(0.0) as usize) % self.frames.len();
        self.frames.get(index)
    }
}

impl WorldSprite for AnimatedSprite {
    fn layer(&self) -> WorldLayer {
        self.layer
    }

    fn y_sort(&self) -> f32 {
        self.rect.center_y()
    }

    fn update(&mut self, dt: f32) {
        self.frame_index += self.animation_speed * dt;
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, sprites: &mut SpriteCache, offset: Vec2) {
        match self.current_frame() {
            Some(frame) => draw_at(canvas, sprites, frame, self.rect, offset),
            None => engine::draw_placeholder(canvas, self.rect.translated(offset)),
        }
    }
}

/// Scenery the player walks behind and bumps into. The hitbox loses 60% of
/// the image height so the player can overlap the top of the object.
pub(crate) struct CollidableSprite {
    frame: FrameRef,
    rect: Rect,
    hitbox: Rect,
}

impl CollidableSprite {
    pub(crate) fn new(frame: FrameRef, rect: Rect) -> Self {
        let hitbox = rect.inflate(0.0, -rect.height * 0.6);
        Self {
            frame,
            rect,
            hitbox,
        }
    }
}

impl WorldSprite for CollidableSprite {
    fn layer(&self) -> WorldLayer {
        WorldLayer::Main
    }

    fn y_sort(&self) -> f32 {
        self.rect.center_y()
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, sprites: &mut SpriteCache, offset: Vec2) {
        draw_at(canvas, sprites, &self.frame, self.rect, offset);
    }

    fn hitbox(&self) -> Option<Rect> {
        Some(self.hitbox)
    }
}

/// Invisible wall from the collision layer.
pub(crate) struct BorderSprite {
    rect: Rect,
}

impl BorderSprite {
    pub(crate) fn new(rect: Rect) -> Self {
        Self { rect }
    }
}

impl WorldSprite for BorderSprite {
    fn layer(&self) -> WorldLayer {
        WorldLayer::Main
    }

    fn y_sort(&self) -> f32 {
        self.rect.center_y()
    }

    fn draw(&mut self, _canvas: &mut Canvas<'_>, _sprites: &mut SpriteCache, _offset: Vec2) {}

    fn hitbox(&self) -> Option<Rect> {
        Some(self.rect)
    }
}

/// Grass (or sand) patch where wild monsters live.
pub(crate) struct MonsterPatch {
    frame: FrameRef,
    rect: Rect,
    biome: String,
}

impl MonsterPatch {
    pub(crate) fn new(frame: FrameRef, rect: Rect, biome: impl Into<String>) -> Self {
        Self {
            frame,
            rect,
            biome: biome.into(),
        }
    }
}

impl WorldSprite for MonsterPatch {
    fn layer(&self) -> WorldLayer {
        if self.biome == SAND_BIOME {
            WorldLayer::Bg
        } else {
            WorldLayer::Main
        }
    }

    fn y_sort(&self) -> f32 {
        self.rect.center_y() + MONSTER_PATCH_SORT_OFFSET
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, sprites: &mut SpriteCache, offset: Vec2) {
        draw_at(canvas, sprites, &self.frame, self.rect, offset);
    }
}

/// Standing character placed by the map. Blocks the player like scenery.
pub(crate) struct NpcSprite {
    body: EntityBody,
}

impl NpcSprite {
    pub(crate) fn new(body: EntityBody) -> Self {
        Self { body }
    }
}

impl WorldSprite for NpcSprite {
    fn layer(&self) -> WorldLayer {
        WorldLayer::Main
    }

    fn y_sort(&self) -> f32 {
        self.body.y_sort
    }

    fn update(&mut self, dt: f32) {
        self.body.animate(dt);
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, sprites: &mut SpriteCache, offset: Vec2) {
        draw_body(canvas, sprites, &mut self.body, offset);
    }

    fn hitbox(&self) -> Option<Rect> {
        Some(self.body.hitbox)
    }
}

pub(crate) fn draw_body(
    canvas: &mut Canvas<'_>,
    sprites: &mut SpriteCache,
    body: &mut EntityBody,
    offset: Vec2,
) {
    let rect = body.rect;
    match body.current_frame() {
        Some(frame) => draw_at(canvas, sprites, frame, rect, offset),
        None => engine::draw_placeholder(canvas, rect.translated(offset)),
    }
}

fn draw_at(
    canvas: &mut Canvas<'_>,
    sprites: &mut SpriteCache,
    frame: &FrameRef,
    rect: Rect,
    offset: Vec2,
) {
    let size = Vec2::new(rect.width, rect.height);
    sprites.draw_frame(canvas, frame, rect.top_left() + offset, size);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> FrameRef {
        FrameRef::whole("graphics/objects/tree.png")
    }

    #[test]
    fn collidable_hitbox_drops_most_of_the_height() {
        let sprite = CollidableSprite::new(frame(), Rect::new(0.0, 0.0, 64.0, 100.0));
        let hitbox = sprite.hitbox().expect("hitbox");
        assert_eq!(hitbox.width, 64.0);
        assert!((hitbox.height - 40.0).abs() < 1e-4);
        assert!((hitbox.center_y() - 50.0).abs() < 1e-4);
    }

    #[test]
    fn monster_patch_layer_depends_on_biome() {
        let rect = Rect::new(0.0, 0.0, 64.0, 64.0);
        let grass = MonsterPatch::new(frame(), rect, "forest");
        let sand = MonsterPatch::new(frame(), rect, "sand");
        assert_eq!(grass.layer(), WorldLayer::Main);
        assert_eq!(sand.layer(), WorldLayer::Bg);
        assert_eq!(grass.y_sort(), -8.0);
    }

    #[test]
    fn animated_sprite_cycles_frames() {
        let frames = vec![FrameRef::whole("water/0.png"), FrameRef::whole("water/1.png")];
        let mut sprite = AnimatedSprite::new(
            frames,
            Rect::new(0.0, 0.0, 64.0, 64.0),
            WorldLayer::Water,
            6.0,
        );
        sprite.update(0.5);
        assert_eq!(
            sprite.current_frame().map(|frame| frame.key.as_str()),
            Some("water/1.png")
        );
    }

    #[test]
    fn layers_order_back_to_front() {
        assert!(WorldLayer::Water < WorldLayer::Bg);
        assert!(WorldLayer::Main < WorldLayer::Top);
    }
}
