// Munich buergeransicht backend endpoints
pub const BASE_URL: &str = "https://www48.muenchen.de/buergeransicht/api/backend";

pub const AVAILABLE_DAYS_PATH: &str = "/available-days";
pub const AVAILABLE_APPOINTMENTS_PATH: &str = "/available-appointments";

/// Public booking frontend, used for the deep link in event descriptions.
pub const BOOKING_URL: &str = "https://www48.muenchen.de/buergeransicht/";

/// The backend always gets queried for a single appointment per request.
pub const SERVICE_COUNT: &str = "1";

pub const DATE_FORMAT: &str = "%Y-%m-%d";
