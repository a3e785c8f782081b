pub mod image_url;
pub mod supabase;
