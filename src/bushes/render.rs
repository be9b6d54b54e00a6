//! Mirrors bush draw descriptors and leaf particles into Bevy sprites.
//!
//! Bushes live as plain data inside their location, so the sprites here are
//! views: one `BushSprite` per bush of the player's current location,
//! rewritten from `TerrainFeature::draw` every frame.

use bevy::prelude::*;
use bevy::sprite::Anchor;

use crate::shared::*;
use crate::world::Locations;

use super::feature::{SheetId, SpriteDraw, TerrainFeature};
use super::particles::TemporarySprite;

/// Sprite sheets used by bushes and their particles.
#[derive(Resource, Debug, Clone, Default)]
pub struct BushAtlas {
    pub wild_bushes: Handle<Image>,
    pub stock_bushes: Handle<Image>,
    pub cursors: Handle<Image>,
    pub animations: Handle<Image>,
}

impl BushAtlas {
    pub fn sheet(&self, sheet: SheetId) -> Handle<Image> {
        match sheet {
            SheetId::WildBushes => self.wild_bushes.clone(),
            SheetId::StockBushes => self.stock_bushes.clone(),
            SheetId::Cursors => self.cursors.clone(),
            SheetId::Animations => self.animations.clone(),
        }
    }
}

/// View of the bush at `index` in the current location's feature list.
#[derive(Component, Debug)]
pub struct BushSprite {
    pub index: usize,
}

/// Asset path of each sheet, relative to `assets/`.
pub fn sheet_path(sheet: SheetId) -> &'static str {
    match sheet {
        SheetId::WildBushes => "textures/wild_bushes.png",
        SheetId::StockBushes => "textures/bushes.png",
        SheetId::Cursors => "textures/cursors.png",
        SheetId::Animations => "textures/animations.png",
    }
}

/// Loads the sheets when an asset server is around.
pub fn load_bush_atlas(mut commands: Commands, asset_server: Option<Res<AssetServer>>) {
    let Some(server) = asset_server else {
        return;
    };
    commands.insert_resource(BushAtlas {
        wild_bushes: server.load(sheet_path(SheetId::WildBushes)),
        stock_bushes: server.load(sheet_path(SheetId::StockBushes)),
        cursors: server.load(sheet_path(SheetId::Cursors)),
        animations: server.load(sheet_path(SheetId::Animations)),
    });
}

fn to_rect(source: URect) -> Rect {
    Rect::new(
        source.min.x as f32,
        source.min.y as f32,
        source.max.x as f32,
        source.max.y as f32,
    )
}

/// Bevy anchor for a pivot given in y-down sheet pixels.
pub fn pivot_anchor(origin: Vec2, source: URect) -> Anchor {
    let size = source.size().as_vec2().max(Vec2::ONE);
    Anchor::Custom(Vec2::new(origin.x / size.x - 0.5, 0.5 - origin.y / size.y))
}

/// Transform for a draw descriptor. Rotation flips sign with the y axis.
pub fn draw_transform(draw: &SpriteDraw) -> Transform {
    Transform {
        translation: world_px_to_translation(draw.position, draw.layer_depth),
        rotation: Quat::from_rotation_z(-draw.rotation),
        scale: Vec3::splat(draw.scale),
    }
}

fn apply_draw(draw: &SpriteDraw, atlas: &BushAtlas, sprite: &mut Sprite, transform: &mut Transform) {
    sprite.image = atlas.sheet(draw.sheet);
    sprite.rect = Some(to_rect(draw.source));
    sprite.flip_x = draw.flip_x;
    sprite.color = Color::WHITE.with_alpha(draw.alpha);
    sprite.anchor = pivot_anchor(draw.origin, draw.source);
    *transform = draw_transform(draw);
}

/// Keeps one sprite per bush of the player's current location.
pub fn sync_bush_sprites(
    mut commands: Commands,
    atlas: Option<Res<BushAtlas>>,
    locations: Res<Locations>,
    player_state: Res<PlayerState>,
    mut views: Query<(Entity, &BushSprite, &mut Sprite, &mut Transform)>,
) {
    let Some(atlas) = atlas else {
        return;
    };
    let bushes = locations
        .get(&player_state.current_location)
        .map(|loc| loc.large_features.as_slice())
        .unwrap_or(&[]);

    let mut seen = vec![false; bushes.len()];
    for (entity, view, mut sprite, mut transform) in views.iter_mut() {
        match bushes.get(view.index) {
            Some(bush) if !seen[view.index] => {
                seen[view.index] = true;
                apply_draw(&bush.draw(), &atlas, &mut sprite, &mut transform);
            }
            _ => commands.entity(entity).despawn(),
        }
    }

    for (index, bush) in bushes.iter().enumerate() {
        if seen[index] {
            continue;
        }
        let mut sprite = Sprite::default();
        let mut transform = Transform::default();
        apply_draw(&bush.draw(), &atlas, &mut sprite, &mut transform);
        commands.spawn((BushSprite { index }, sprite, transform));
    }
}

/// Gives freshly spawned particles a sprite.
pub fn attach_temporary_sprite_visuals(
    mut commands: Commands,
    atlas: Option<Res<BushAtlas>>,
    added: Query<(Entity, &TemporarySprite), Added<TemporarySprite>>,
) {
    let Some(atlas) = atlas else {
        return;
    };
    for (entity, particle) in added.iter() {
        commands.entity(entity).insert(Sprite {
            image: atlas.sheet(particle.sheet),
            rect: Some(to_rect(particle.current_source())),
            color: particle.color.with_alpha(particle.alpha),
            ..default()
        });
    }
}

/// Frame and fade follow the particle simulation.
pub fn update_temporary_sprite_visuals(mut particles: Query<(&TemporarySprite, &mut Sprite)>) {
    for (particle, mut sprite) in particles.iter_mut() {
        sprite.rect = Some(to_rect(particle.current_source()));
        sprite.color = particle.color.with_alpha(particle.alpha);
    }
}
