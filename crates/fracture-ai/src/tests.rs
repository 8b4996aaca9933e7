#[cfg(test)]
mod tests {
    use glam::Vec3;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use fracture_core::config::GameConfig;
    use fracture_core::constants::*;
    use fracture_core::enums::{AiState, EnemyWeaponType};

    use crate::fsm::{evaluate, TacticalContext};
    use crate::profiles::{get_profile, shot_directions, FirePattern, DEFAULT_BURST};
    use crate::steering::{select_attack, steer, AttackAction, AttackContext, SteeringContext};

    /// Enemy on the floor at the origin, player level with it `distance` away on +Z.
    fn make_context(
        state: AiState,
        distance: f32,
        torso_fraction: f32,
        roll: f32,
    ) -> TacticalContext {
        TacticalContext {
            state,
            decision_due: true,
            position: Vec3::ZERO,
            player_position: Vec3::new(0.0, 1.7, distance),
            distance_to_player: distance,
            torso_fraction,
            has_line_of_sight: true,
            in_updraft: false,
            roll,
        }
    }

    fn make_steering(state: AiState, player: Vec3) -> SteeringContext {
        SteeringContext {
            state,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            player_position: player,
            cover_target: None,
            nearest_updraft: None,
            serial: 1,
            now: 0.0,
            has_line_of_sight: false,
            melee_capable: true,
        }
    }

    #[test]
    fn test_player_above_triggers_updraft_seek() {
        let mut ctx = make_context(AiState::Chase, 10.0, 1.0, 0.9);
        ctx.player_position.y = 12.0 + 1.7;
        let update = evaluate(&ctx);
        assert_eq!(update.new_state, AiState::SeekUpdraft);
        assert!(update.state_changed);
    }

    #[test]
    fn test_updraft_rider_returns_to_chase_above_player() {
        let mut ctx = make_context(AiState::SeekUpdraft, 10.0, 1.0, 0.9);
        ctx.decision_due = false;
        ctx.in_updraft = true;
        ctx.player_position.y = 13.7;
        ctx.position.y = 14.0;
        assert_eq!(evaluate(&ctx).new_state, AiState::SeekUpdraft, "not yet clear of the player");

        ctx.position.y = 13.7 + UPDRAFT_EXIT_MARGIN + 0.1;
        let update = evaluate(&ctx);
        assert_eq!(update.new_state, AiState::Chase);
        assert!(update.left_updraft);
    }

    #[test]
    fn test_no_change_between_decisions() {
        let mut ctx = make_context(AiState::Flank, 5.0, 1.0, 0.9);
        ctx.decision_due = false;
        let update = evaluate(&ctx);
        assert_eq!(update.new_state, AiState::Flank);
        assert!(!update.state_changed);
    }

    #[test]
    fn test_critical_health_retreat_is_a_coin_flip() {
        let retreat = evaluate(&make_context(AiState::Chase, 10.0, 0.1, 0.7));
        assert_eq!(retreat.new_state, AiState::TacticalCover);
        assert!(retreat.seek_cover);

        let stand = evaluate(&make_context(AiState::Flank, 10.0, 0.1, 0.3));
        assert_eq!(stand.new_state, AiState::Flank, "losing the roll keeps the current state");
        assert!(!stand.seek_cover);
    }

    #[test]
    fn test_critical_health_already_in_cover_stays_put() {
        let update = evaluate(&make_context(AiState::TacticalCover, 10.0, 0.1, 0.9));
        assert_eq!(update.new_state, AiState::TacticalCover);
        assert!(!update.seek_cover, "does not re-pick cover every decision");
    }

    #[test]
    fn test_ranged_tactics_roll() {
        let cover = evaluate(&make_context(AiState::Chase, 25.0, 1.0, 0.1));
        assert_eq!(cover.new_state, AiState::TacticalCover);
        assert!(cover.seek_cover);

        let mut blind = make_context(AiState::Chase, 25.0, 1.0, 0.1);
        blind.has_line_of_sight = false;
        assert_eq!(evaluate(&blind).new_state, AiState::Flank, "no cover without sight");

        let flank = evaluate(&make_context(AiState::Chase, 25.0, 1.0, 0.3));
        assert_eq!(flank.new_state, AiState::Flank);

        let chase = evaluate(&make_context(AiState::Flank, 25.0, 1.0, 0.8));
        assert_eq!(chase.new_state, AiState::Chase);
    }

    #[test]
    fn test_close_range_always_chases() {
        let update = evaluate(&make_context(AiState::TacticalCover, 8.0, 1.0, 0.05));
        assert_eq!(update.new_state, AiState::Chase);
        assert!(update.state_changed);
    }

    #[test]
    fn test_steering_suppressed_while_tumbling() {
        let mut ctx = make_steering(AiState::Chase, Vec3::new(0.0, 1.7, 20.0));
        ctx.velocity = Vec3::new(3.0, 0.0, 0.0);
        assert_eq!(steer(&ctx), Vec3::ZERO);
    }

    #[test]
    fn test_chase_heads_for_player() {
        let ctx = make_steering(AiState::Chase, Vec3::new(0.0, 1.7, 40.0));
        let dir = steer(&ctx);
        assert!((dir - Vec3::Z).length() < 1e-5, "dir {dir:?}");
    }

    #[test]
    fn test_chase_strafes_with_sight() {
        let mut ctx = make_steering(AiState::Chase, Vec3::new(0.0, 1.7, 20.0));
        ctx.has_line_of_sight = true;
        let dir = steer(&ctx);
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(dir.z > 0.8, "still closing: {dir:?}");
        assert!(dir.x.abs() > 0.3, "with a sideways component: {dir:?}");
    }

    #[test]
    fn test_disarmed_enemy_stops_at_knife_range() {
        let mut ctx = make_steering(AiState::Chase, Vec3::new(0.0, 1.7, 2.0));
        assert!(steer(&ctx).z > 0.9);
        ctx.melee_capable = false;
        assert_eq!(steer(&ctx), Vec3::ZERO);
    }

    #[test]
    fn test_flank_side_follows_serial_parity() {
        let mut ctx = make_steering(AiState::Flank, Vec3::new(0.0, 0.0, 10.0));
        ctx.serial = 1;
        let odd = steer(&ctx);
        ctx.serial = 2;
        let even = steer(&ctx);
        assert!(odd.dot(Vec3::Z).abs() < 1e-5, "perpendicular to the player");
        assert!((odd + even).length() < 1e-5, "opposite sides");
    }

    #[test]
    fn test_updraft_seek_is_faster() {
        let mut ctx = make_steering(AiState::SeekUpdraft, Vec3::new(0.0, 14.0, 0.0));
        ctx.nearest_updraft = Some(Vec3::new(-25.0, 0.0, 0.0));
        let dir = steer(&ctx);
        assert!((dir - Vec3::new(-AI_UPDRAFT_SPEED_FACTOR, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_cover_arrival_stops() {
        let mut ctx = make_steering(AiState::TacticalCover, Vec3::new(0.0, 1.7, 20.0));
        ctx.cover_target = Some(Vec3::new(0.0, 0.0, -4.0));
        assert!((steer(&ctx) - Vec3::NEG_Z).length() < 1e-5);
        ctx.cover_target = Some(Vec3::new(0.2, 0.0, 0.1));
        assert_eq!(steer(&ctx), Vec3::ZERO);
    }

    fn make_attack(distance: f32) -> AttackContext {
        AttackContext {
            distance_to_player: distance,
            melee_capable: true,
            ranged_capable: true,
            weapon_range: 70.0,
            melee_ready: true,
            fire_ready: true,
        }
    }

    #[test]
    fn test_knife_range_prefers_melee() {
        let ctx = make_attack(2.0);
        assert_eq!(select_attack(&ctx, || true), AttackAction::Melee);

        let cooling = AttackContext {
            melee_ready: false,
            ..make_attack(2.0)
        };
        assert_eq!(select_attack(&cooling, || true), AttackAction::Hold, "waits out the knife");

        let no_knife = AttackContext {
            melee_capable: false,
            ..make_attack(2.0)
        };
        assert_eq!(select_attack(&no_knife, || true), AttackAction::Fire);
    }

    #[test]
    fn test_fire_needs_arm_range_and_sight() {
        assert_eq!(select_attack(&make_attack(30.0), || true), AttackAction::Fire);
        assert_eq!(select_attack(&make_attack(30.0), || false), AttackAction::Hold);
        assert_eq!(select_attack(&make_attack(80.0), || true), AttackAction::Hold);

        let disarmed = AttackContext {
            ranged_capable: false,
            ..make_attack(30.0)
        };
        let mut checked = false;
        let action = select_attack(&disarmed, || {
            checked = true;
            true
        });
        assert_eq!(action, AttackAction::Hold);
        assert!(!checked, "sight is not traced when the shot is impossible anyway");
    }

    #[test]
    fn test_weapon_profiles() {
        let config = GameConfig::default();
        let shotgun = get_profile(
            EnemyWeaponType::Shotgun,
            config.enemy_weapons.get(EnemyWeaponType::Shotgun),
        );
        assert_eq!(shotgun.pattern, FirePattern::Burst { pellets: 8 });

        let mut stats = config.enemy_weapons.shotgun.clone();
        stats.burst = None;
        let fallback = get_profile(EnemyWeaponType::Shotgun, &stats);
        assert_eq!(fallback.pattern, FirePattern::Burst { pellets: DEFAULT_BURST });

        let flamer = get_profile(
            EnemyWeaponType::Flamethrower,
            config.enemy_weapons.get(EnemyWeaponType::Flamethrower),
        );
        assert_eq!(flamer.pattern, FirePattern::Stream);
        assert!(!flamer.audible);
    }

    #[test]
    fn test_shot_directions_stay_near_aim() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let aim = Vec3::new(0.0, 0.0, -1.0);
        let pellets = shot_directions(FirePattern::Burst { pellets: 8 }, aim, 0.25, &mut rng);
        assert_eq!(pellets.len(), 8);
        for dir in &pellets {
            assert!((dir.length() - 1.0).abs() < 1e-5);
            // Each axis moves by at most spread/2, so the cone is narrow.
            assert!(dir.dot(aim) > 0.9, "pellet {dir:?} strayed");
        }
        let single = shot_directions(FirePattern::Single, aim, 0.0, &mut rng);
        assert_eq!(single, vec![aim]);
    }
}
