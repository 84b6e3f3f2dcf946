/// Declare a plugin and export the symbols libxante looks up.
///
/// Generates a `static` [`PluginRuntime`](crate::plugin::PluginRuntime)
/// backed by [`NativeToolkit`](crate::toolkit::NativeToolkit), the four
/// metadata accessors, the five mandatory lifecycle functions and one
/// function per custom hook, named exactly as listed. A handler cannot share
/// its symbol's name, since both live in the calling module. Requires the
/// `native` feature and a `cdylib` crate.
///
/// ```ignore
/// fn on_greet(event: &Event<'_>, log: &Logger<'_>) -> HookResult {
///     let item = event.require_item()?;
///     log.info(item.name());
///     Ok(0)
/// }
///
/// xante::export_plugin! {
///     info: {
///         name: "demo",
///         version: "0.1.0",
///         author: "someone",
///         description: "says hello",
///     },
///     hooks: {
///         init: on_init,
///         config_load: on_config_load,
///     },
///     custom: {
///         greet => on_greet,
///     },
/// }
/// ```
#[macro_export]
macro_rules! export_plugin {
    (
        info: {
            name: $name:expr,
            version: $version:expr,
            author: $author:expr,
            description: $description:expr $(,)?
        },
        hooks: { $($slot:ident : $hook:expr),* $(,)? },
        custom: { $($symbol:ident => $handler:expr),* $(,)? } $(,)?
    ) => {
        static __XANTE_PLUGIN: $crate::plugin::PluginRuntime<$crate::toolkit::NativeToolkit> =
            $crate::plugin::PluginRuntime::new(
                $crate::toolkit::NativeToolkit,
                $crate::plugin::PluginInfo {
                    name: $name,
                    version: $version,
                    author: $author,
                    description: $description,
                },
                $crate::plugin::HookTable {
                    $($slot: ::core::option::Option::Some($hook),)*
                    custom: &[
                        $((::core::stringify!($symbol), $handler as $crate::plugin::EventHook),)*
                    ],
                    ..$crate::plugin::HookTable::EMPTY
                },
            );

        #[unsafe(no_mangle)]
        pub extern "C" fn plugin_name() -> *mut ::std::ffi::c_char {
            __XANTE_PLUGIN.metadata($crate::interface::PLUGIN_NAME)
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn plugin_version() -> *mut ::std::ffi::c_char {
            __XANTE_PLUGIN.metadata($crate::interface::PLUGIN_VERSION)
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn plugin_author() -> *mut ::std::ffi::c_char {
            __XANTE_PLUGIN.metadata($crate::interface::PLUGIN_AUTHOR)
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn plugin_description() -> *mut ::std::ffi::c_char {
            __XANTE_PLUGIN.metadata($crate::interface::PLUGIN_DESCRIPTION)
        }

        /// # Safety
        ///
        /// Called by the toolkit's plugin loader.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn xapl_init(args: *mut ::std::ffi::c_void) -> ::std::ffi::c_int {
            unsafe { __XANTE_PLUGIN.init(args) }
        }

        /// # Safety
        ///
        /// Called by the toolkit's plugin loader.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn xapl_uninit(args: *mut ::std::ffi::c_void) {
            unsafe { __XANTE_PLUGIN.uninit(args) }
        }

        /// # Safety
        ///
        /// Called by the toolkit with the callback's argument map.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn xapl_config_load(args: *mut ::std::ffi::c_void) {
            unsafe { __XANTE_PLUGIN.config_load(args) }
        }

        /// # Safety
        ///
        /// Called by the toolkit with the callback's argument map.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn xapl_config_unload(args: *mut ::std::ffi::c_void) {
            unsafe { __XANTE_PLUGIN.config_unload(args) }
        }

        /// # Safety
        ///
        /// Called by the toolkit with the callback's argument map.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn xapl_changes_saved(
            args: *mut ::std::ffi::c_void,
        ) -> ::std::ffi::c_int {
            unsafe { __XANTE_PLUGIN.changes_saved(args) }
        }

        $(
            /// # Safety
            ///
            /// Called by the toolkit with the callback's argument map.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn $symbol(args: *mut ::std::ffi::c_void) -> ::std::ffi::c_int {
                unsafe { __XANTE_PLUGIN.call(::core::stringify!($symbol), args) }
            }
        )*
    };
}
