mod end_to_end;
mod fail_safe;

use guard_common::config::GuardConfig;

/// Two cabinets, cabinet 2 authorized, vertical line at x = 500.
pub const SITE: &str = r#"
[shared]
service_name = "integration"

[line]
a = 1.0
b = 0.0
c = -500.0
outer_safe_px = 20.0
inner_danger_px = -10.0
frame_width_px = 1280.0
frame_height_px = 720.0

[site]
authorized_cabinets = [2]

[[cabinets]]
cabinet_id = 1
d_min_m = 1.8
d_max_m = 2.2

[[cabinets]]
cabinet_id = 2
d_min_m = 3.3
d_max_m = 3.7
"#;

pub fn site_config() -> GuardConfig {
    GuardConfig::from_toml_str(SITE).unwrap()
}
