//! Bootstrap schema.
//!
//! Three tables back the messaging server that talks to this gateway:
//! registered accounts, login history, and reported file uploads. All
//! statements are `IF NOT EXISTS`, so running them at every startup is safe.

/// Account registry: one row per username.
pub const CREATE_USERS: &str = "CREATE TABLE IF NOT EXISTS Users (
    username TEXT PRIMARY KEY,
    password TEXT NOT NULL
)";

/// Session history: logout_time stays NULL while the session is open.
pub const CREATE_LOGINS: &str = "CREATE TABLE IF NOT EXISTS Logins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL,
    login_time DATETIME NOT NULL,
    logout_time DATETIME,
    FOREIGN KEY(username) REFERENCES Users(username)
)";

/// Uploaded files, optionally tagged with the channel they were reported to.
pub const CREATE_FILES: &str = "CREATE TABLE IF NOT EXISTS Files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL,
    filename TEXT NOT NULL,
    game_channel TEXT,
    upload_time DATETIME NOT NULL,
    FOREIGN KEY(username) REFERENCES Users(username)
)";

/// Every bootstrap statement, in creation order.
pub const SCHEMA: [&str; 3] = [CREATE_USERS, CREATE_LOGINS, CREATE_FILES];

/// Table names created by [`SCHEMA`].
pub const TABLES: [&str; 3] = ["Users", "Logins", "Files"];
