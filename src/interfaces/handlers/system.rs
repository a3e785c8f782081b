use actix_web::{web, get, HttpResponse, Responder};
use humantime::format_duration;
use once_cell::sync::Lazy;
use chrono::Utc;
use parking_lot::RwLock;
use std::{
    time::Duration,
    sync::atomic::{AtomicI64, Ordering},
};
use sysinfo::System;
use serde::Serialize;

use crate::{
    constants::{OUTPUTS_TABLE, START_TIME},
    errors::RemoteError,
    repositories::gateway::RowQuery,
    AppState,
};

#[derive(Serialize, Clone, Default)]
struct SystemInfo {
    os: String,
    kernel: String,
    hostname: String,
    cpu_count: usize,
    memory_total: String,
}

#[derive(Serialize, Clone, Default)]
struct HealthCheckResponse {
    status: String,
    uptime: String,
    timestamp: String,
    start_at: String,
    remote: String,
    active_sessions: usize,
    open_admin_desks: usize,
    version: String,
    memory_usage: String,
    system: SystemInfo,
}

static LAST_CHECK: AtomicI64 = AtomicI64::new(0);
static CACHED_STATUS: Lazy<RwLock<HealthCheckResponse>> = Lazy::new(||
    RwLock::new(HealthCheckResponse::default())
);

async fn build_health_response(state: &web::Data<AppState>) -> HealthCheckResponse {
    let now_utc = Utc::now();
    let uptime_duration = now_utc.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime_duration.num_seconds().max(0) as u64));

    let mut sys = System::new_all();
    sys.refresh_all();

    let system_info = SystemInfo {
        os: System::name().unwrap_or_else(|| "Unknown".to_string()),
        kernel: System::kernel_version().unwrap_or_else(|| "Unknown".to_string()),
        hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        cpu_count: sys.cpus().len(),
        memory_total: format!("{:.2} GB", sys.total_memory() as f64 / 1024.0 / 1024.0 / 1024.0),
    };

    let remote_status = match state.gateway.fetch_rows(OUTPUTS_TABLE, &RowQuery::new().limit(1)).await {
        Ok(_) => "OK",
        Err(RemoteError::NotConfigured) => "Not configured",
        Err(e) => {
            tracing::warn!("Health check remote probe failed: {}", e);
            "Unavailable"
        }
    };

    let memory_usage = sysinfo::get_current_pid()
        .ok()
        .and_then(|pid| sys.process(pid))
        .map_or("Unknown".to_string(), |p| format!("{:.2} MB", p.memory() as f64 / 1024.0 / 1024.0));

    HealthCheckResponse {
        status: "healthy".to_string(),
        uptime: human_uptime.to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        remote: remote_status.to_string(),
        active_sessions: state.auth_handler.active_sessions(),
        open_admin_desks: state.workspace.len(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        memory_usage,
        system: system_info,
    }
}

#[get("/health")]
pub async fn admin_health_check(state: web::Data<AppState>) -> impl Responder {
    let now = Utc::now().timestamp();
    let last = LAST_CHECK.load(Ordering::Relaxed);

    if now - last > 5 {
        let response = build_health_response(&state).await;
        *CACHED_STATUS.write() = response.clone();
        LAST_CHECK.store(now, Ordering::Relaxed);

        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::Ok().json(CACHED_STATUS.read().clone())
    }
}
