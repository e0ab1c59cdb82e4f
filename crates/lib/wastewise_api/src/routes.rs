//! Route paths.

pub const GET_API_HEALTH: &str = "/api/health";

pub const POST_USERS_SIGNUP: &str = "/api/users/signup";
pub const POST_USERS_LOGIN: &str = "/api/users/login";
pub const POST_USERS_LOGOUT: &str = "/api/users/logout";
pub const GET_USERS_ME: &str = "/api/users/me";
pub const PUT_USERS_ME_PASSWORD: &str = "/api/users/me/password";

pub const POST_AREA_MANAGERS_LOGIN: &str = "/api/area-managers/manager-login";
pub const AREA_MANAGERS: &str = "/api/area-managers";
pub const AREA_MANAGERS_NIC: &str = "/api/area-managers/{nic}";

pub const COMPLAINTS: &str = "/api/complaints";
pub const GET_COMPLAINTS_MINE: &str = "/api/complaints/my-complaints";
pub const GET_COMPLAINTS_AREA: &str = "/api/complaints/area";
pub const PATCH_COMPLAINTS_ID_STATUS: &str = "/api/complaints/{id}/status";
pub const PATCH_COMPLAINTS_ID_PROGRESS: &str = "/api/complaints/{id}/progress";

pub const GET_ANALYTICS_BY_AREA: &str = "/api/analytics/complaints-by-area-detailed";
pub const GET_ANALYTICS_BY_STATUS: &str = "/api/analytics/complaints-by-status";
pub const GET_ANALYTICS_BY_PROGRESS: &str = "/api/analytics/complaints-by-progress";
