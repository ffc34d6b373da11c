/// Road-network edge closest to a geometry.
#[derive(Debug, Clone)]
pub struct Road {
    pub id: i64,
    pub way_name: Option<String>,
}

/// Municipality containing a geometry.
#[derive(Debug, Clone)]
pub struct Municipality {
    pub id: i64,
    pub name: String,
}
