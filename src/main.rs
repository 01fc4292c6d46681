// ==========================================
// 家具质检系统 - 命令行入口
// ==========================================
// 用法:
//   furniture-qc [db_path] plans
//   furniture-qc [db_path] release <plan_id> <qty> [actor]
//   furniture-qc [db_path] stats
// 省略 db_path 时使用 FURNITURE_QC_DB_PATH 或用户数据目录
// ==========================================

use anyhow::{anyhow, bail, Context};
use furniture_qc::app::{get_default_db_path, AppState};
use furniture_qc::logging;

const USAGE: &str = "usage: furniture-qc [db_path] <plans|release <plan_id> <qty> [actor]|stats>";

fn is_command(arg: &str) -> bool {
    matches!(arg, "plans" | "release" | "stats")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let explicit_db_path = args.first().map_or(false, |first| !is_command(first));
    let db_path = if explicit_db_path {
        args.remove(0)
    } else {
        get_default_db_path()
    };
    let mut args = args.into_iter();
    let command = args.next().ok_or_else(|| anyhow!(USAGE))?;

    tracing::info!("{} v{}", furniture_qc::APP_NAME, furniture_qc::VERSION);
    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;

    match command.as_str() {
        "plans" => {
            for group in state.plan_api.grouped_by_area()? {
                println!("== {} ==", group.area);
                for plan in group.plans {
                    println!(
                        "{}  {}  {}  pedido={}  cliente={}  {}/{}  pendiente={}",
                        plan.plan_id,
                        plan.product,
                        plan.color,
                        plan.order_no,
                        plan.customer,
                        plan.released,
                        plan.ordered_quantity,
                        plan.pending()
                    );
                }
            }
        }
        "release" => {
            let plan_id = args.next().context(USAGE)?;
            let quantity = args.next().context(USAGE)?;
            let actor = args.next();

            match state
                .plan_api
                .release(&plan_id, &quantity, actor.as_deref())
                .await
            {
                Ok(outcome) => println!("{}", outcome.message),
                Err(e) => {
                    eprintln!("{}", state.plan_api.error_message(&e));
                    return Err(e.into());
                }
            }
        }
        "stats" => {
            let stats = state.dashboard_api.statistics(None)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        other => bail!("unknown command `{}`\n{}", other, USAGE),
    }

    Ok(())
}
