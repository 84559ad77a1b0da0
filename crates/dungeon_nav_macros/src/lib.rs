use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, ItemFn, LitInt};

/// Time a function when the `perf_stats` feature is enabled.
///
/// The generated guard logs the elapsed time on exit when it exceeds the
/// threshold (milliseconds, default 1). Independently of the threshold, every
/// 100th call of the function is logged so that cheap per-query functions
/// still show up in the perf log. Compiles to the bare function body when
/// `perf_stats` is disabled.
///
/// # Example
/// ```ignore
/// #[profile]
/// pub fn find_path(/* ... */) -> Vec<FixedVec2> { /* ... */ }
///
/// #[profile(5)] // only log runs slower than 5ms
/// pub fn build_portal_graph(/* ... */) -> PortalGraph { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        match syn::parse::<LitInt>(attr) {
            Ok(lit) => lit.base10_parse().unwrap_or(1),
            Err(err) => return err.to_compile_error().into(),
        }
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name_str = sig.ident.to_string();

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_timer = {
                static CALLS: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

                struct ProfileGuard {
                    name: &'static str,
                    start: std::time::Instant,
                    call: u64,
                }
                impl Drop for ProfileGuard {
                    fn drop(&mut self) {
                        let elapsed = self.start.elapsed();
                        if elapsed.as_millis() > #threshold_ms || self.call % 100 == 0 {
                            bevy::prelude::info!("[PERF] {} (call {}): {:?}", self.name, self.call, elapsed);
                        }
                    }
                }
                ProfileGuard {
                    name: #fn_name_str,
                    start: std::time::Instant::now(),
                    call: CALLS.fetch_add(1, std::sync::atomic::Ordering::Relaxed),
                }
            };

            #block
        }
    };

    output.into()
}
