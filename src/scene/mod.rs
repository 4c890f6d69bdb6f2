pub(crate) mod series;
