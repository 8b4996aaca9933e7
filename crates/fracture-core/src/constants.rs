//! Simulation constants and tuning parameters.
//!
//! Distances are world units (roughly meters), times are seconds.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

/// Downward acceleration applied to the player, enemies and debris.
pub const GRAVITY: f32 = 25.0;

// --- Arena bounds ---

/// Falling below this altitude is fatal for actors.
pub const FALL_THRESHOLD: f32 = -10.0;

/// Damage applied on a fatal fall.
pub const FALL_DAMAGE: f32 = 100.0;

/// Enemies are clamped to +/- this on X and Z.
pub const ARENA_CLAMP: f32 = 48.0;

/// Debris below this altitude is culled.
pub const DEBRIS_CULL_ALTITUDE: f32 = -50.0;

/// Debris further than this from the arena centre is culled.
pub const DEBRIS_CULL_RADIUS: f32 = 150.0;

/// Oldest debris is dropped once this many pieces exist.
pub const DEBRIS_CAP: usize = 256;

// --- Player ---

/// Player spawn and respawn point (eye position).
pub const PLAYER_SPAWN: [f32; 3] = [0.0, 5.0, 0.0];

/// Eye position at match start.
pub const PLAYER_START: [f32; 3] = [0.0, 1.7, 5.0];

pub const PLAYER_MAX_HEALTH: f32 = 100.0;

pub const PLAYER_WALK_SPEED: f32 = 1.5;

/// Speed while moving forward without backing up.
pub const PLAYER_RUN_SPEED: f32 = 2.25;

/// Scale from move speed to target horizontal velocity.
pub const PLAYER_ACCEL_SCALE: f32 = 8.0;

/// Rate (1/s) at which horizontal velocity approaches its target.
pub const PLAYER_VELOCITY_RESPONSE: f32 = 10.0;

/// Speed multiplier while aiming or shielding.
pub const PLAYER_FOCUS_SLOWDOWN: f32 = 0.5;

pub const PLAYER_JUMP_VELOCITY: f32 = 10.0;

/// Collision body, centred `PLAYER_BODY_DROP` below the eye.
pub const PLAYER_BODY_SIZE: [f32; 3] = [0.6, 1.7, 0.6];
pub const PLAYER_BODY_DROP: f32 = 0.75;

/// Seconds between reaching zero health and respawning.
pub const PLAYER_RESPAWN_DELAY: f64 = 2.0;

/// Enemy shots closer than this to the eye hit the player.
pub const PLAYER_HIT_RADIUS: f32 = 0.8;

// --- Updrafts ---

/// Climb acceleration applied to enemies riding an updraft.
pub const UPDRAFT_CLIMB_ACCEL: f32 = 60.0;

/// An enemy leaves the updraft once this far above the player.
pub const UPDRAFT_EXIT_MARGIN: f32 = 2.0;

// --- Player weapons ---

/// Lockout after dry-firing.
pub const EMPTY_FIRE_LOCKOUT: f64 = 0.5;

/// Spread multiplier while aiming.
pub const AIM_SPREAD_FACTOR: f32 = 0.05;

/// Projectiles start this far along the shot direction from the eye.
pub const MUZZLE_OFFSET: f32 = 1.0;

/// Aim assist locks parts within this angle (radians) of the view.
pub const AIM_ASSIST_CONE: f32 = 0.3;

// --- Shield ---

/// Melee is blocked when dot(view, dir-to-attacker) exceeds this.
pub const SHIELD_BLOCK_DOT: f32 = 0.5;

/// Enemy shots within this distance of the eye can be deflected.
pub const SHIELD_DEFLECT_RANGE: f32 = 3.0;

/// Deflection requires dot(view, shot-direction) below this.
pub const SHIELD_DEFLECT_DOT: f32 = 0.0;

pub const DEFLECT_SPEED_FACTOR: f32 = 2.0;
pub const DEFLECT_LIFETIME: f32 = 2.0;
pub const DEFLECT_TAG: u32 = 0xffff00;

// --- Projectiles ---

pub const PROJECTILE_LIFETIME: f32 = 3.0;

/// Fraction of the way the flight direction turns toward a homing target each tick.
pub const HOMING_BLEND: f32 = 0.5;

/// A locked shot connects when this close to its target part.
pub const LOCKED_HIT_RADIUS: f32 = 1.0;

/// Aim point above an enemy's feet when its locked part is gone.
pub const CHEST_HEIGHT: f32 = 1.35;

/// Part height above the feet for a crawling enemy.
pub const CRAWL_HEIGHT: f32 = 0.5;

/// Fraction of the blast impulse applied to debris.
pub const BLAST_DEBRIS_FACTOR: f32 = 1.5;

/// Vertical nudge applied to bodies caught in a blast.
pub const BLAST_LIFT: f32 = 0.5;

pub const BLAST_SMOKE_COUNT: usize = 30;
pub const BLAST_SPARK_COUNT: usize = 15;

// --- Enemies ---

/// Live enemies kept in the arena.
pub const ENEMY_POPULATION: usize = 6;

/// Seconds after a kill before the replacement spawns.
pub const ENEMY_RESPAWN_DELAY: f64 = 4.0;

pub const KILL_SCORE: u32 = 100;

pub const ENEMY_MIN_SPEED: f32 = 2.0;
pub const ENEMY_SPEED_SPREAD: f32 = 2.0;

/// Eye height above an enemy's feet.
pub const ENEMY_EYE_HEIGHT: f32 = 1.6;

/// Enemies aim this far below the player's eye.
pub const PLAYER_CHEST_DROP: f32 = 0.2;

/// Enemy collision hull, bottom at the feet.
pub const ENEMY_HULL_SIZE: [f32; 3] = [0.6, 2.2, 0.6];

/// Horizontal velocity retained per tick.
pub const ENEMY_DAMPING: f32 = 0.9;

/// Speed added along the shot direction when a part is hit.
pub const HIT_IMPULSE: f32 = 2.0;

/// Upward kick given to parts shed on death.
pub const DEATH_SCATTER_LIFT: f32 = 2.0;

pub const MELEE_RANGE: f32 = 3.5;
pub const MELEE_DAMAGE: f32 = 15.0;
pub const MELEE_COOLDOWN: f64 = 1.0;

/// Seconds between tactical re-evaluations.
pub const DECISION_INTERVAL: f64 = 0.6;

/// Steering is only recomputed while slower than this.
pub const STEERING_SPEED_LIMIT: f32 = 2.0;

/// Muzzle offsets in the enemy's local frame.
pub const ENEMY_MUZZLE: [f32; 3] = [0.45, 1.4, 0.5];
pub const ENEMY_CRAWL_MUZZLE: [f32; 3] = [0.45, 0.5, 0.8];

// --- Enemy tactics ---

/// Player this far above an enemy sends it looking for an updraft.
pub const AI_UPDRAFT_TRIGGER: f32 = 5.0;

/// Torso fraction below which an enemy considers falling back to cover.
pub const AI_CRITICAL_HEALTH: f32 = 0.2;

/// Chance a badly hurt enemy actually takes cover on a decision tick.
pub const AI_RETREAT_CHANCE: f32 = 0.5;

/// Beyond this distance an enemy rolls between cover, flank and chase.
pub const AI_ENGAGE_DISTANCE: f32 = 15.0;

pub const AI_COVER_CHANCE: f32 = 0.15;

/// Rolls below this (and above the cover chance) flank.
pub const AI_FLANK_CHANCE: f32 = 0.4;

/// Chasers within this distance strafe while they close in.
pub const AI_STRAFE_DISTANCE: f32 = 30.0;

pub const AI_STRAFE_WEIGHT: f32 = 0.5;

/// Angular frequency (rad/s) of the chase strafe oscillation.
pub const AI_STRAFE_FREQUENCY: f64 = 2.0;

/// Speed multiplier while heading for an updraft.
pub const AI_UPDRAFT_SPEED_FACTOR: f32 = 1.5;

/// Speed multiplier while riding an updraft toward the player.
pub const AI_UPDRAFT_DRIFT_FACTOR: f32 = 2.0;

/// Walls further than this are not considered for cover.
pub const COVER_SEARCH_RADIUS: f32 = 30.0;

/// Candidate cover points sit this far from the wall centre on X and Z.
pub const COVER_OFFSET: f32 = 4.0;

/// Line-of-sight ignores hits this close to either end of the segment.
pub const LOS_END_MARGIN: f32 = 0.5;

/// Segments shorter than this always have line of sight.
pub const LOS_MIN_DISTANCE: f32 = 1.0;

/// Placement attempts before a spawn falls back to an unchecked point.
pub const SPAWN_ATTEMPTS: usize = 16;

// --- Cosmetics ---

pub const PARTICLE_LIFETIME: f32 = 1.0;

/// Fraction of vertical speed kept on a debris bounce.
pub const DEBRIS_BOUNCE: f32 = 0.5;

/// Horizontal and angular speed kept on a debris bounce.
pub const DEBRIS_FRICTION: f32 = 0.8;
