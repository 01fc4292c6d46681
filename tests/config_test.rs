// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 独立连接读写 config_kv，与 API 共享同一数据库文件
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

use furniture_qc::config::{config_keys, ConfigManager};
use furniture_qc::domain::Area;
use test_helpers::{create_test_db, new_plan, ApiTestEnv};

#[test]
fn test_config_manager_creation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    let config_manager = ConfigManager::new(&db_path);
    assert!(
        config_manager.is_ok(),
        "ConfigManager should be created successfully"
    );
}

#[test]
fn test_defaults_on_fresh_database() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    assert_eq!(config_manager.get_default_actor().unwrap(), "capturista");
    assert_eq!(config_manager.get_top_defects_limit().unwrap(), 10);
    assert_eq!(config_manager.get_locale().unwrap(), "es");
    assert_eq!(config_manager.get_config_snapshot().unwrap(), "{}");
}

#[tokio::test]
async fn test_override_visible_to_api() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    // 另一个连接写入配置，API 下一次调用即生效
    let writer = ConfigManager::new(&env.db_path).expect("Failed to create ConfigManager");
    writer
        .set_config_value(config_keys::DEFAULT_ACTOR, "supervisor")
        .unwrap();
    writer.set_config_value(config_keys::LOCALE, "en").unwrap();

    let plan = env.plan_api.create_plan(new_plan(Area::Sillas, 3)).unwrap();
    let outcome = env.plan_api.release(&plan.plan_id, "1", None).await.unwrap();

    assert_eq!(outcome.receipt.event.actor, "supervisor");
    assert_eq!(outcome.message, "Released 1 pieces. Pending: 2");
}

#[test]
fn test_blank_value_falls_back_to_default() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    config_manager
        .set_config_value(config_keys::DEFAULT_ACTOR, "   ")
        .unwrap();
    assert_eq!(config_manager.get_default_actor().unwrap(), "capturista");
}
