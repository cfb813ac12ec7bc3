pub mod api_structs;
