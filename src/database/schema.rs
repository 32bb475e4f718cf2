diesel::table! {
    /// Cached APOD images metadata.
    images (id) {
        /// Primary key.
        id -> Integer,

        /// Path to the image file in the images directory.
        location_path -> Text,

        /// Size of the image in bytes at write time.
        file_size -> BigInt,

        // Manually added UNIQUE to up.sql, because diesel can't do that
        /// Lowercase hex SHA-256 digest of the image content.
        hash_value -> Text,

        /// When the entry was recorded.
        date_time -> TimestamptzSqlite,
    }
}
