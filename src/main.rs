//! Breakwater Fishing demo
//!
//! Runs a scripted angler against the fishing core with a tiny stand-in for
//! the physics engine, logging every intent. Pass a settings JSON path as the
//! first argument to override the default tuning.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Breakwater Fishing (native demo) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match breakwater_fishing::Settings::load(&path) {
            Ok(s) => s,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => breakwater_fishing::Settings::default(),
    };

    demo::run(settings, 7, 4);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The core is driven by the host game on the web; nothing to run here
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use breakwater_fishing::consts::*;
    use breakwater_fishing::settings::Settings;
    use breakwater_fishing::sim::{
        ActionInput, CastReelSession, CastState, CatchCatalog, CatchDef, CatchId, Feedback,
        Intent, ItemDef, ItemKind, ItemStack, Platform, Rarity, RarityWeights, ReelSpec, Rig,
        SlotInventory, TickInput, tick,
    };
    use glam::Vec2;

    const WATER_Y: f32 = -0.3;
    /// Give up on a cast after this long (seconds)
    const CAST_LIMIT: f32 = 20.0;

    fn catalog() -> CatchCatalog {
        let def = |id: &str, species: &str, rarity, base_price, min, max| CatchDef {
            id: id.to_string(),
            species: species.to_string(),
            rarity,
            base_price,
            price_per_cm: 1.5,
            min_length_cm: min,
            max_length_cm: max,
        };
        CatchCatalog::new(vec![
            def("goby", "Goby", Rarity::Common, 20, 5.0, 15.0),
            def("horse_mackerel", "Horse mackerel", Rarity::Common, 40, 15.0, 35.0),
            def("rockfish", "Rockfish", Rarity::Uncommon, 80, 15.0, 30.0),
            def("sea_bass", "Sea bass", Rarity::Rare, 200, 30.0, 80.0),
            def("red_sea_bream", "Red sea bream", Rarity::Epic, 400, 30.0, 70.0),
            def("oarfish", "Oarfish", Rarity::Legendary, 1500, 200.0, 500.0),
        ])
    }

    fn inventory(settings: &Settings) -> SlotInventory {
        let worm = ItemDef::new(
            "lugworm",
            "Lugworm",
            ItemKind::Bait {
                weights: RarityWeights {
                    common: 5,
                    uncommon: 3,
                    rare: 1,
                    epic: 0,
                    legendary: 0,
                },
            },
        );
        let reel = ItemDef::new(
            "spinning_reel",
            "Spinning reel",
            ItemKind::Reel(ReelSpec {
                horizontal_mul: 1.2,
                full_reel_mul: 1.5,
                ..ReelSpec::default()
            }),
        );
        SlotInventory::new(settings.tackle_slots().end)
            .with(settings.reel_slot, ItemStack::new(reel, 1))
            .with(settings.bait_slot_base, ItemStack::new(worm, 5))
    }

    /// Stand-in for the physics engine
    #[derive(Default)]
    struct World {
        hook: Option<(Vec2, Vec2, bool)>,
        catches: Vec<(CatchId, Vec2, Vec2)>,
    }

    impl World {
        fn apply(&mut self, intent: &Intent) {
            match intent {
                Intent::SpawnHook { position, velocity } => {
                    self.hook = Some((*position, *velocity, true));
                }
                Intent::HookMotion { velocity, gravity } => {
                    if let Some(hook) = self.hook.as_mut() {
                        hook.1 = *velocity;
                        hook.2 = *gravity;
                    }
                }
                Intent::DestroyHook => self.hook = None,
                Intent::SpawnCatch(spawn) => {
                    self.catches.push((spawn.id, spawn.position, spawn.velocity));
                }
                _ => {}
            }
        }

        /// Integrate one step, returning (hook touched water, landed catches)
        fn step(
            &mut self,
            casting: bool,
            ground_y: f32,
            gravity: f32,
            dt: f32,
        ) -> (bool, Vec<CatchId>) {
            let mut touched = false;
            if let Some((pos, vel, falls)) = self.hook.as_mut() {
                if *falls {
                    vel.y += gravity * dt;
                }
                *pos += *vel * dt;
                if casting && pos.y <= WATER_Y {
                    pos.y = WATER_Y;
                    touched = true;
                }
            }

            let mut landed = Vec::new();
            self.catches.retain_mut(|(id, pos, vel)| {
                vel.y += gravity * dt;
                *pos += *vel * dt;
                if vel.y < 0.0 && pos.y <= ground_y {
                    landed.push(*id);
                    return false;
                }
                true
            });
            (touched, landed)
        }
    }

    pub fn run(settings: Settings, seed: u64, casts: u32) {
        let platform = Platform {
            edge_x: 0.0,
            left_edge_x: -6.0,
            surface_y: 0.0,
        };
        let rig = Rig {
            platform: Some(platform),
            catalog: catalog(),
            obstacle: None,
        };
        let mut inv = inventory(&settings);
        let ground_y = platform.surface_y + settings.ground_y_offset;
        let gravity = settings.gravity;
        let mut session = CastReelSession::new(settings, rig, seed);
        if !session.is_enabled() {
            log::error!("Session disabled, nothing to do");
            return;
        }

        let rod_tip = Vec2::new(0.0, 1.2);
        let player = Vec2::new(0.0, 0.0);
        let mut world = World::default();
        let mut landed_total = 0usize;
        let mut total_value = 0i32;

        for attempt in 1..=casts {
            log::info!("--- Cast {} ---", attempt);
            let mut elapsed = 0.0f32;
            let mut started = false;
            let mut bite_at: Option<f32> = None;
            let mut input = TickInput {
                rod_tip,
                player,
                ..Default::default()
            };

            while elapsed < CAST_LIMIT {
                input.hook = world.hook.map(|(pos, _, _)| pos);
                input.action = if !started {
                    ActionInput::press()
                } else {
                    match bite_at {
                        // Strike a beat after the bite
                        Some(t) if elapsed - t >= 0.15 => ActionInput::release(),
                        Some(t) if elapsed - t >= 0.05 => ActionInput::hold(),
                        _ => ActionInput::default(),
                    }
                };

                tick(&mut session, &mut inv, &input, SIM_DT);
                for intent in session.drain_intents() {
                    log::info!("t={:.2} {:?}", session.now(), intent);
                    match &intent {
                        Intent::PlayFeedback(Feedback::BiteDetected) => bite_at = Some(elapsed),
                        Intent::SpawnCatch(spawn) => total_value += spawn.catch.value,
                        _ => {}
                    }
                    world.apply(&intent);
                }
                if input.action.down {
                    started = true;
                }
                if input.action.up {
                    bite_at = None;
                }

                let casting = session.state() == CastState::Casting;
                let (touched, landed) = world.step(casting, ground_y, gravity, SIM_DT);
                input.hook_touched_water = touched;
                landed_total += landed.len();
                input.landed = landed;
                elapsed += SIM_DT;

                if started && session.state() == CastState::Idle {
                    break;
                }
            }

            log::info!(
                "Cast {} done, {} lugworm left",
                attempt,
                inv.count(session.settings().bait_slot_base)
            );
            if attempt == 2 {
                session.settings_mut().upgrade_multi_catch();
            }
        }

        // Let the last catches land
        for _ in 0..600 {
            let (_, landed) = world.step(false, ground_y, gravity, SIM_DT);
            landed_total += landed.len();
            if world.catches.is_empty() {
                break;
            }
        }
        log::info!(
            "Demo finished: {} catches landed, haul worth {}",
            landed_total,
            total_value
        );
    }
}
