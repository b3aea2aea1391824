use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;
use kendo_engine::{
    action_weights, decide_cpu_action, resolve_distance, AnyArbiter, ArbiterSettings, Catalog,
    DecisionContext, Dice, Distance, MatchState, Movement, PlayerWindow, Referee, Stance,
};
use serde::Deserialize;
use serde_json::{json, Value};

pub const VERSION: &str = concat!("kendo-ffi ", env!("CARGO_PKG_VERSION"));

fn envelope(result: Result<Value, String>) -> String {
    match result {
        Ok(value) => json!({ "ok": true, "result": value }).to_string(),
        Err(e) => json!({ "ok": false, "error": e }).to_string(),
    }
}

fn respond(env: &JNIEnv, result: Result<Value, String>) -> jstring {
    match env.new_string(envelope(result)) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn read_string(env: &mut JNIEnv, s: &JString) -> Result<String, String> {
    env.get_string(s).map(Into::into).map_err(|e| e.to_string())
}

#[no_mangle]
pub extern "system" fn Java_com_kendo_Ffi_version(env: JNIEnv, _class: JClass) -> jstring {
    match env.new_string(VERSION) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "system" fn Java_com_kendo_Ffi_catalogJson(env: JNIEnv, _class: JClass) -> jstring {
    respond(&env, catalog_internal())
}

#[no_mangle]
pub extern "system" fn Java_com_kendo_Ffi_newMatchJson(
    mut env: JNIEnv,
    _class: JClass,
    stance: JString,
) -> jstring {
    let result = read_string(&mut env, &stance).and_then(|s| new_match_internal(&s));
    respond(&env, result)
}

#[no_mangle]
pub extern "system" fn Java_com_kendo_Ffi_resolveDistance(
    mut env: JNIEnv,
    _class: JClass,
    current: JString,
    player: JString,
    cpu: JString,
) -> jstring {
    let result = (|| {
        let current = read_string(&mut env, &current)?;
        let player = read_string(&mut env, &player)?;
        let cpu = read_string(&mut env, &cpu)?;
        resolve_distance_internal(&current, &player, &cpu)
    })();
    respond(&env, result)
}

#[no_mangle]
pub extern "system" fn Java_com_kendo_Ffi_decideCpuActionJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    let result = read_string(&mut env, &json).and_then(|s| decide_cpu_action_internal(&s));
    respond(&env, result)
}

/// Blocks the calling thread until the arbiter answers or times out.
#[no_mangle]
pub extern "system" fn Java_com_kendo_Ffi_resolveTurnJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    let result = read_string(&mut env, &json).and_then(|s| resolve_turn_internal(&s));
    respond(&env, result)
}

// Internal functions for testing without JNI overhead

pub fn catalog_internal() -> Result<Value, String> {
    let catalog = Catalog::builtin().map_err(|e| e.to_string())?;
    let movements: Vec<Value> = Movement::ALL
        .iter()
        .map(|m| json!({ "id": m.id(), "name": m.name() }))
        .collect();
    Ok(json!({ "techniques": catalog.techniques(), "movements": movements }))
}

pub fn new_match_internal(stance: &str) -> Result<Value, String> {
    let stance = Stance::parse(stance).ok_or_else(|| format!("invalid_stance: {}", stance))?;
    let state = MatchState::new(stance, Stance::Aggressive);
    serde_json::to_value(state).map_err(|e| e.to_string())
}

pub fn resolve_distance_internal(current: &str, player: &str, cpu: &str) -> Result<Value, String> {
    let catalog = Catalog::builtin().map_err(|e| e.to_string())?;
    let current =
        Distance::parse(current).ok_or_else(|| format!("invalid_distance: {}", current))?;
    let p = catalog
        .parse_action(player)
        .ok_or_else(|| format!("invalid_action: {}", player))?;
    let c = catalog
        .parse_action(cpu)
        .ok_or_else(|| format!("invalid_action: {}", cpu))?;
    Ok(json!(resolve_distance(current, &p, &c)))
}

#[derive(Deserialize)]
struct DecideInput {
    #[serde(default)]
    distance: Distance,
    #[serde(default)]
    player_stance: Stance,
    #[serde(default = "aggressive")]
    cpu_stance: Stance,
    #[serde(default)]
    recent_player_actions: PlayerWindow,
    #[serde(default)]
    seed: u64,
}

fn aggressive() -> Stance {
    Stance::Aggressive
}

pub fn decide_cpu_action_internal(input: &str) -> Result<Value, String> {
    let input: DecideInput =
        serde_json::from_str(input).map_err(|e| format!("invalid_input: {}", e))?;
    let catalog = Catalog::builtin().map_err(|e| e.to_string())?;
    let ctx = DecisionContext {
        distance: input.distance,
        player_stance: input.player_stance,
        cpu_stance: input.cpu_stance,
        recent_player_actions: &input.recent_player_actions,
    };
    let weights = action_weights(&catalog, &ctx);
    let mut dice = Dice::from_seed(input.seed);
    let action = decide_cpu_action(&catalog, &ctx, &mut dice);
    Ok(json!({ "action": action.id(), "weights": weights }))
}

#[derive(Deserialize)]
struct TurnInput {
    state: MatchState,
    action: String,
    seed: Option<u64>,
}

pub fn resolve_turn_internal(input: &str) -> Result<Value, String> {
    let input: TurnInput =
        serde_json::from_str(input).map_err(|e| format!("invalid_input: {}", e))?;
    let catalog = Catalog::builtin().map_err(|e| e.to_string())?;
    let arbiter = AnyArbiter::from_env(&ArbiterSettings::from_env());
    let dice = match input.seed {
        Some(seed) => Dice::from_seed(seed),
        None => Dice::from_entropy(),
    };
    let mut referee = Referee::new(catalog, arbiter, dice);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| e.to_string())?;
    let report = rt
        .block_on(referee.resolve_turn(&input.state, &input.action))
        .map_err(|e| format!("rejected: {}", e))?;
    Ok(json!({
        "state": report.state,
        "outcome": report.outcome,
        "kind": report.kind,
    }))
}
