pub mod info_route;
