use engine::{Canvas, Color, FrameRef, InputSnapshot, Rect, SpriteCache, Vec2};

use super::pet::{Pet, PetAction, PetCosts, Species};

pub(crate) const LAYOUT_WIDTH: f32 = 700.0;
pub(crate) const LAYOUT_HEIGHT: f32 = 420.0;
const NAME_MAX_CHARS: usize = 16;
const CURSOR_BLINK_SECONDS: f32 = 0.4;
const STATUS_SECONDS: f32 = 2.5;

const BACKGROUND: Color = [245, 245, 250, 255];
const WHITE: Color = [255, 255, 255, 255];
const BLACK: Color = [0, 0, 0, 255];
const GRAY: Color = [200, 200, 200, 255];
const ACCENT: Color = [255, 215, 0, 255];
const FIELD: Color = [240, 240, 240, 255];
const WARM_BAR: Color = [200, 100, 50, 255];
const COOL_BAR: Color = [0, 200, 0, 255];
const STATUS: Color = [170, 30, 30, 255];
const SKIN: Color = [200, 160, 100, 255];
const SHADOW: Color = [30, 30, 30, 255];

const TEXT_SCALE: i32 = 2;
const TITLE_SCALE: i32 = 4;

const PET_PANEL: Rect = Rect::new(20.0, 20.0, 320.0, 320.0);
const STATS_PANEL: Rect = Rect::new(360.0, 40.0, 310.0, 260.0);
const NAME_FIELD: Rect = Rect::new(380.0, 320.0, 220.0, 34.0);
const PET_CENTER: Vec2 = Vec2::new(200.0, 180.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ButtonId {
    Action(PetAction),
    NextSpecies,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Button {
    pub(crate) id: ButtonId,
    pub(crate) rect: Rect,
    pub(crate) label: String,
}

/// What the player asked for this tick.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum UiCommand {
    Act(PetAction),
    NextSpecies,
    Rename(String),
}

fn buttons(costs: PetCosts) -> Vec<Button> {
    let button = |id, x, y, width, label: String| Button {
        id,
        rect: Rect::new(x, y, width, 36.0),
        label,
    };
    vec![
        button(
            ButtonId::Action(PetAction::Feed),
            40.0,
            320.0,
            120.0,
            format!("Feed (${})", costs.feed),
        ),
        button(
            ButtonId::Action(PetAction::Play),
            180.0,
            320.0,
            120.0,
            "Play".to_string(),
        ),
        button(
            ButtonId::Action(PetAction::Rest),
            40.0,
            360.0,
            120.0,
            "Rest".to_string(),
        ),
        button(
            ButtonId::Action(PetAction::Clean),
            180.0,
            360.0,
            120.0,
            format!("Clean (${})", costs.clean),
        ),
        button(
            ButtonId::Action(PetAction::HealthCheck),
            120.0,
            40.0,
            160.0,
            format!("Health (${})", costs.health_check),
        ),
        button(
            ButtonId::NextSpecies,
            510.0,
            366.0,
            160.0,
            "Next Species".to_string(),
        ),
    ]
}

/// Top-left corner of the layout when centred in a window of `window_size`.
pub(crate) fn layout_origin(window_size: Vec2) -> Vec2 {
    Vec2::new(
        ((window_size.x - LAYOUT_WIDTH) * 0.5).max(0.0).floor(),
        ((window_size.y - LAYOUT_HEIGHT) * 0.5).max(0.0).floor(),
    )
}

/// Buttons, name field and status line of the pet screen.
pub(crate) struct PetUi {
    buttons: Vec<Button>,
    images_dir: String,
    name_buffer: String,
    input_active: bool,
    clock_seconds: f32,
    status: Option<(String, f32)>,
}

impl PetUi {
    pub(crate) fn new(costs: PetCosts, images_dir: impl Into<String>) -> Self {
        Self {
            buttons: buttons(costs),
            images_dir: images_dir.into().trim_end_matches('/').to_string(),
            name_buffer: String::new(),
            input_active: false,
            clock_seconds: 0.0,
            status: None,
        }
    }

    pub(crate) fn sync_name(&mut self, name: &str) {
        self.name_buffer = name.to_string();
        self.input_active = false;
    }

    #[cfg(test)]
    pub(crate) fn name_buffer(&self) -> &str {
        &self.name_buffer
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.input_active
    }

    pub(crate) fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(text, _)| text.as_str())
    }

    pub(crate) fn show_status(&mut self, text: impl Into<String>) {
        self.status = Some((text.into(), STATUS_SECONDS));
    }

    pub(crate) fn tick(&mut self, dt: f32) {
        self.clock_seconds += dt;
        if let Some((_, remaining)) = self.status.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.status = None;
            }
        }
    }

    fn cursor_visible(&self) -> bool {
        self.input_active && (self.clock_seconds / CURSOR_BLINK_SECONDS) as u32 % 2 == 0
    }

    /// Turns clicks and typing into commands. Clicks hit buttons first, then
    /// focus or blur the name field.
    pub(crate) fn handle_input(&mut self, input: &InputSnapshot) -> Vec<UiCommand> {
        let mut commands = Vec::new();

        if input.left_click_pressed() {
            if let Some(cursor) = input.cursor_position_px() {
                let (width, height) = input.window_size();
                let local = cursor - layout_origin(Vec2::new(width as f32, height as f32));
                for button in &self.buttons {
                    if button.rect.contains_point(local) {
                        commands.push(match button.id {
                            ButtonId::Action(action) => UiCommand::Act(action),
                            ButtonId::NextSpecies => UiCommand::NextSpecies,
                        });
                    }
                }
                self.input_active = NAME_FIELD.contains_point(local);
            }
        }

        if !self.input_active {
            return commands;
        }
        let text = input.text();
        for ch in text.typed.iter().copied() {
            if self.name_buffer.chars().count() < NAME_MAX_CHARS && !ch.is_control() {
                self.name_buffer.push(ch);
            }
        }
        if text.backspace_pressed {
            self.name_buffer.pop();
        }
        if text.enter_pressed {
            let trimmed = self.name_buffer.trim().to_string();
            if !trimmed.is_empty() {
                commands.push(UiCommand::Rename(trimmed));
            }
            self.input_active = false;
        }
        commands
    }

    pub(crate) fn draw(&self, canvas: &mut Canvas<'_>, sprites: &mut SpriteCache, pet: &Pet) {
        canvas.clear(BACKGROUND);
        let origin = layout_origin(canvas.size());
        let at = |rect: Rect| rect.translated(origin);
        let text_at = |x: f32, y: f32| origin + Vec2::new(x, y);

        canvas.fill_rect(at(PET_PANEL), WHITE);
        canvas.rect_outline(at(PET_PANEL), 2.0, ACCENT);
        self.draw_pet(canvas, sprites, pet, origin);

        canvas.fill_rect(at(STATS_PANEL), WHITE);
        canvas.rect_outline(at(STATS_PANEL), 2.0, ACCENT);
        canvas.draw_text(text_at(370.0, 48.0), "Pet Info", TITLE_SCALE, BLACK);
        let bars = [
            ("Hunger", pet.hunger(), WARM_BAR),
            ("Happiness", pet.happiness(), COOL_BAR),
            ("Energy", pet.energy(), COOL_BAR),
            ("Cleanliness", pet.cleanliness(), COOL_BAR),
        ];
        for (row, (label, value, color)) in bars.into_iter().enumerate() {
            let y = 90.0 + row as f32 * 40.0;
            let text = format!("{label}: {}", value as i32);
            canvas.draw_text(text_at(380.0, y), &text, TEXT_SCALE, BLACK);
            canvas.fill_rect(at(Rect::new(380.0, y + 22.0, 220.0, 18.0)), GRAY);
            let filled = (value / 100.0 * 220.0).floor();
            canvas.fill_rect(at(Rect::new(380.0, y + 22.0, filled, 18.0)), color);
        }
        let health = format!("Health: {}", pet.health() as i32);
        canvas.draw_text(text_at(380.0, 250.0), &health, TEXT_SCALE, BLACK);
        let money = format!("Money: ${}", pet.money());
        canvas.draw_text(text_at(380.0, 270.0), &money, TEXT_SCALE, BLACK);
        let expenses = format!("Expenses: ${}", pet.expenses_total());
        canvas.draw_text(text_at(380.0, 286.0), &expenses, TEXT_SCALE, BLACK);

        canvas.fill_rect(at(NAME_FIELD), FIELD);
        if self.input_active {
            canvas.rect_outline(at(NAME_FIELD), 1.0, ACCENT);
        }
        canvas.draw_text(text_at(388.0, 332.0), "Name:", TEXT_SCALE, BLACK);
        let mut name = self.name_buffer.clone();
        if self.cursor_visible() {
            name.push('|');
        }
        canvas.draw_text(text_at(438.0, 332.0), &name, TEXT_SCALE, BLACK);

        let species = format!("Species: {}", pet.species.as_str());
        canvas.draw_text(text_at(380.0, 380.0), &species, TEXT_SCALE, BLACK);
        canvas.draw_text(
            text_at(20.0, 404.0),
            "Move: none   Interact: click buttons   Tab: back",
            TEXT_SCALE,
            BLACK,
        );

        for button in &self.buttons {
            canvas.fill_rect(at(button.rect), GRAY);
            canvas.rect_outline(at(button.rect), 2.0, ACCENT);
            let label_height = engine::line_height(TEXT_SCALE) as f32;
            let label_y = button.rect.y + (button.rect.height - label_height) * 0.5;
            canvas.draw_text(
                text_at(button.rect.x + 8.0, label_y.floor()),
                &button.label,
                TEXT_SCALE,
                BLACK,
            );
        }

        canvas.draw_text(text_at(24.0, 280.0), &pet.name, TITLE_SCALE, BLACK);
        if let Some(status) = self.status() {
            canvas.draw_text(text_at(20.0, 4.0), status, TEXT_SCALE, STATUS);
        }
    }

    fn draw_pet(
        &self,
        canvas: &mut Canvas<'_>,
        sprites: &mut SpriteCache,
        pet: &Pet,
        origin: Vec2,
    ) {
        let center = origin + PET_CENTER;
        let (key, size) = match pet.species {
            Species::Fish => (
                format!("{}/fish.png", self.images_dir),
                Vec2::new(160.0, 120.0),
            ),
            species => (
                format!(
                    "{}/{}_{}.png",
                    self.images_dir,
                    species.as_str(),
                    pet.reaction().as_str()
                ),
                Vec2::new(200.0, 200.0),
            ),
        };
        if sprites.contains(&key) {
            let dest = Rect::from_center(center, size.x, size.y);
            sprites.draw_frame_scaled(canvas, &FrameRef::whole(key), dest);
            return;
        }

        canvas.fill_ellipse(
            Rect::new(center.x - 60.0, center.y + 50.0, 120.0, 20.0),
            SHADOW,
        );
        canvas.fill_circle(center, 80.0, SKIN);
        canvas.fill_rect(Rect::new(center.x - 36.0, center.y - 26.0, 12.0, 12.0), BLACK);
        canvas.fill_rect(Rect::new(center.x + 24.0, center.y - 26.0, 12.0, 12.0), BLACK);
        canvas.fill_rect(Rect::new(center.x - 16.0, center.y + 18.0, 32.0, 6.0), BLACK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: (u32, u32) = (1280, 720);

    fn ui() -> PetUi {
        let mut ui = PetUi::new(PetCosts::default(), "graphics/pets");
        ui.sync_name("Buddy");
        ui
    }

    fn click(local: Vec2) -> InputSnapshot {
        let origin = layout_origin(Vec2::new(WINDOW.0 as f32, WINDOW.1 as f32));
        InputSnapshot::empty()
            .with_window_size(WINDOW)
            .with_cursor_position_px(Some(origin + local))
            .with_left_click_pressed(true)
    }

    fn typing(text: &str) -> InputSnapshot {
        InputSnapshot::empty()
            .with_window_size(WINDOW)
            .with_typed_text(text)
    }

    #[test]
    fn layout_is_centred() {
        assert_eq!(layout_origin(Vec2::new(1280.0, 720.0)), Vec2::new(290.0, 150.0));
        assert_eq!(layout_origin(Vec2::new(600.0, 400.0)), Vec2::ZERO);
    }

    #[test]
    fn button_labels_show_costs() {
        let labels = ui()
            .buttons
            .iter()
            .map(|button| button.label.clone())
            .collect::<Vec<_>>();
        assert!(labels.contains(&"Feed ($5)".to_string()));
        assert!(labels.contains(&"Clean ($3)".to_string()));
        assert!(labels.contains(&"Health ($10)".to_string()));
    }

    #[test]
    fn clicks_map_to_buttons() {
        let mut ui = ui();
        assert_eq!(
            ui.handle_input(&click(Vec2::new(50.0, 330.0))),
            vec![UiCommand::Act(PetAction::Feed)]
        );
        assert_eq!(
            ui.handle_input(&click(Vec2::new(200.0, 50.0))),
            vec![UiCommand::Act(PetAction::HealthCheck)]
        );
        assert_eq!(
            ui.handle_input(&click(Vec2::new(600.0, 380.0))),
            vec![UiCommand::NextSpecies]
        );
        assert!(ui.handle_input(&click(Vec2::new(5.0, 5.0))).is_empty());
    }

    #[test]
    fn typing_edits_only_a_focused_field() {
        let mut ui = ui();
        assert!(ui.handle_input(&typing("x")).is_empty());
        assert_eq!(ui.name_buffer(), "Buddy");

        ui.handle_input(&click(Vec2::new(400.0, 330.0)));
        assert!(ui.is_editing());
        ui.handle_input(&typing("!"));
        ui.handle_input(&typing("\u{7}"));
        assert_eq!(ui.name_buffer(), "Buddy!");

        ui.handle_input(&click(Vec2::new(5.0, 5.0)));
        assert!(!ui.is_editing());
    }

    #[test]
    fn name_is_capped_and_committed_trimmed() {
        let mut ui = ui();
        ui.handle_input(&click(Vec2::new(400.0, 330.0)));
        for _ in 0..5 {
            ui.handle_input(&InputSnapshot::empty().with_backspace_pressed(true));
        }
        ui.handle_input(&typing("  Captain Whiskers the Third"));
        assert_eq!(ui.name_buffer().chars().count(), NAME_MAX_CHARS);

        let commands = ui.handle_input(&InputSnapshot::empty().with_enter_pressed(true));
        assert_eq!(commands, vec![UiCommand::Rename("Captain Whiske".to_string())]);
        assert!(!ui.is_editing());
    }

    #[test]
    fn blank_name_is_not_committed() {
        let mut ui = ui();
        ui.handle_input(&click(Vec2::new(400.0, 330.0)));
        for _ in 0..5 {
            ui.handle_input(&InputSnapshot::empty().with_backspace_pressed(true));
        }
        ui.handle_input(&typing("   "));
        let commands = ui.handle_input(&InputSnapshot::empty().with_enter_pressed(true));
        assert!(commands.is_empty());
    }

    #[test]
    fn status_expires() {
        let mut ui = ui();
        ui.show_status("Not enough money");
        ui.tick(1.0);
        assert_eq!(ui.status(), Some("Not enough money"));
        ui.tick(2.0);
        assert_eq!(ui.status(), None);
    }

    #[test]
    fn cursor_blinks_while_editing() {
        let mut ui = ui();
        ui.handle_input(&click(Vec2::new(400.0, 330.0)));
        assert!(ui.cursor_visible());
        ui.tick(0.5);
        assert!(!ui.cursor_visible());
        ui.tick(0.4);
        assert!(ui.cursor_visible());
    }

    #[test]
    fn missing_images_draw_fallback_face() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut sprites = SpriteCache::new(temp.path().to_path_buf());
        let mut buffer = vec![0; 700 * 420 * 4];
        let mut canvas = Canvas::new(&mut buffer, 700, 420);

        ui().draw(&mut canvas, &mut sprites, &Pet::default());
        assert_eq!(canvas.pixel(200, 180), Some(SKIN));
        assert_eq!(canvas.pixel(5, 5), Some(BACKGROUND));
    }
}
