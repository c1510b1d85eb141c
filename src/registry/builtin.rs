use phf::phf_map;

/// PROJ.4 definitions registered in every [`ProjectionRegistry`][super::ProjectionRegistry]
/// before any lookup happens.
///
/// Note that PROJ.4 definitions are always longitude first, regardless of the EPSG axis order.
pub(crate) static BUILTIN_DEFINITIONS: phf::Map<u32, &'static str> = phf_map! {
    // WGS84
    4326u32 => "+proj=longlat +datum=WGS84 +ellps=WGS84 +no_defs",
    // Web Mercator
    3857u32 => "+proj=merc +a=6378137 +b=6378137 +lat_ts=0.0 +lon_0=0 +x_0=0 +y_0=0 +k=1.0 +units=m +no_defs",
    // Belgium Lambert 1972
    31370u32 => "+proj=lcc +lat_1=51.166667 +lat_2=49.833333 +lat_0=90 +lon_0=4.367486666666667 +x_0=150000.013 +y_0=5400088.438 +ellps=intl +units=m +no_defs",
    // ETRS89 geographic
    4258u32 => "+proj=longlat +ellps=GRS80 +no_defs",
    // ETRS89 / LAEA Europe
    3035u32 => "+proj=laea +lat_0=52 +lon_0=10 +x_0=4321000 +y_0=3210000 +ellps=GRS80 +units=m +no_defs",
    // ETRS89 / UTM zone 32N
    25832u32 => "+proj=utm +zone=32 +ellps=GRS80 +units=m +no_defs",
    // ETRS89 / UTM zone 33N
    25833u32 => "+proj=utm +zone=33 +ellps=GRS80 +units=m +no_defs",
};
