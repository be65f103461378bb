use std::cmp::Ordering;

use engine::{Canvas, Rect, SpriteCache, Vec2};

use super::entity::EntityBody;
use super::sprites::{draw_body, WorldLayer, WorldSprite};

/// Owns every sprite of the current map. Dropped wholesale on map change.
#[derive(Default)]
pub(crate) struct EntityRegistry {
    sprites: Vec<Box<dyn WorldSprite>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DrawItem {
    Sprite(usize),
    Player,
}

impl EntityRegistry {
    pub(crate) fn add(&mut self, sprite: impl WorldSprite + 'static) {
        self.sprites.push(Box::new(sprite));
    }

    pub(crate) fn len(&self) -> usize {
        self.sprites.len()
    }

    pub(crate) fn update_all(&mut self, dt: f32) {
        for sprite in &mut self.sprites {
            sprite.update(dt);
        }
    }

    pub(crate) fn collision_hitboxes(&self) -> Vec<Rect> {
        self.sprites
            .iter()
            .filter_map(|sprite| sprite.hitbox())
            .collect()
    }

    /// Draws layer by layer; the main layer (player included) is ordered by
    /// `y_sort`, everything else keeps insertion order.
    pub(crate) fn draw(
        &mut self,
        canvas: &mut Canvas<'_>,
        sprites: &mut SpriteCache,
        offset: Vec2,
        mut player: Option<&mut EntityBody>,
    ) {
        let player_y_sort = player.as_ref().map(|body| body.y_sort);
        for item in self.draw_order(player_y_sort) {
            match item {
                DrawItem::Sprite(index) => {
                    if let Some(sprite) = self.sprites.get_mut(index) {
                        sprite.draw(canvas, sprites, offset);
                    }
                }
                DrawItem::Player => {
                    if let Some(body) = player.as_deref_mut() {
                        draw_body(canvas, sprites, body, offset);
                    }
                }
            }
        }
    }

    fn draw_order(&self, player_y_sort: Option<f32>) -> Vec<DrawItem> {
        let mut order = Vec::with_capacity(self.sprites.len() + 1);
        for layer in WorldLayer::ALL {
            let mut items = self
                .sprites
                .iter()
                .enumerate()
                .filter(|(_, sprite)| sprite.layer() == layer)
                .map(|(index, sprite)| (DrawItem::Sprite(index), sprite.y_sort()))
                .collect::<Vec<_>>();
            if layer == WorldLayer::Main {
                if let Some(y_sort) = player_y_sort {
                    items.push((DrawItem::Player, y_sort));
                }
                items.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
            }
            order.extend(items.into_iter().map(|(item, _)| item));
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use engine::FrameRef;

    use super::*;
    use crate::app::overworld::sprites::{BorderSprite, CollidableSprite, StaticSprite};

    fn tile(y: f32, layer: WorldLayer) -> StaticSprite {
        StaticSprite::new(
            FrameRef::whole("tile.png"),
            Rect::new(0.0, y, 64.0, 64.0),
            layer,
        )
    }

    #[test]
    fn draw_order_groups_layers_and_sorts_main() {
        let mut registry = EntityRegistry::default();
        registry.add(tile(0.0, WorldLayer::Top));
        registry.add(tile(300.0, WorldLayer::Main));
        registry.add(tile(0.0, WorldLayer::Bg));
        registry.add(tile(100.0, WorldLayer::Main));
        registry.add(tile(0.0, WorldLayer::Water));

        let order = registry.draw_order(Some(200.0));
        assert_eq!(
            order,
            vec![
                DrawItem::Sprite(4),
                DrawItem::Sprite(2),
                DrawItem::Sprite(3),
                DrawItem::Player,
                DrawItem::Sprite(1),
                DrawItem::Sprite(0),
            ]
        );
    }

    #[test]
    fn hitboxes_come_from_blocking_sprites_only() {
        let mut registry = EntityRegistry::default();
        registry.add(tile(0.0, WorldLayer::Bg));
        registry.add(BorderSprite::new(Rect::new(0.0, 0.0, 10.0, 10.0)));
        registry.add(CollidableSprite::new(
            FrameRef::whole("rock.png"),
            Rect::new(0.0, 0.0, 10.0, 10.0),
        ));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.collision_hitboxes().len(), 2);
    }
}
