/// Persistent record identifier, as handed out by the query resolver.
pub type Id = String;
